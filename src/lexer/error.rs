use super::token::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexicalErrorKind {
    #[error("Unexpected character: {0}")]
    Unrecognized(char),
    #[error("Unterminated string.")]
    UnclosedString,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("[line {line}] Error: {kind}")]
pub struct LexicalError {
    #[source]
    pub kind: LexicalErrorKind,
    pub span: Span,
    pub line: u32,
}

impl LexicalError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexicalErrorKind::Unrecognized(_) => "LX001",
            LexicalErrorKind::UnclosedString => "LX002",
        }
    }
}
