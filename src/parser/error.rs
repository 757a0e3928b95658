use crate::lexer::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expect '{}' after {after}.", .expected.symbol().unwrap_or_default())]
    UnexpectedToken {
        actual: TokenKind,
        expected: TokenKind,
        after: &'static str,
    },
    #[error("Expect expression.")]
    NonExpression(TokenKind),
    #[error("Expect variable name.")]
    NonIdentifier(TokenKind),
    #[error("Invalid assignment target.")]
    InvalidLValue,
    #[error("Too much nesting.")]
    TooDeep,
}

/// The first grammar violation in a program. Parsing stops here.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("[line {}] {kind}", .token.line)]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    /// The token the parser was looking at.
    pub token: Token,
}

impl ParserError {
    pub fn line(&self) -> u32 {
        self.token.line
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "PA001",
            ParserErrorKind::NonExpression(_) => "PA002",
            ParserErrorKind::NonIdentifier(_) => "PA003",
            ParserErrorKind::InvalidLValue => "PA004",
            ParserErrorKind::TooDeep => "PA005",
        }
    }
}
