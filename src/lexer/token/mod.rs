mod span;

pub use span::{SpanIndex, SpanLength};
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Range;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    HashMap::from([
        ("and", TokenKind::KeywordAnd),
        ("class", TokenKind::KeywordClass),
        ("else", TokenKind::KeywordElse),
        ("false", TokenKind::KeywordFalse),
        ("for", TokenKind::KeywordFor),
        ("fun", TokenKind::KeywordFun),
        ("if", TokenKind::KeywordIf),
        ("nil", TokenKind::KeywordNil),
        ("or", TokenKind::KeywordOr),
        ("print", TokenKind::KeywordPrint),
        ("return", TokenKind::KeywordReturn),
        ("super", TokenKind::KeywordSuper),
        ("this", TokenKind::KeywordThis),
        ("true", TokenKind::KeywordTrue),
        ("var", TokenKind::KeywordVar),
        ("while", TokenKind::KeywordWhile),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// The byte position of the start of the token.
    pub start: SpanIndex,
    /// The length of the token in bytes.
    pub length: SpanLength,
}

impl Span {
    pub fn new(start: SpanIndex, end: SpanIndex) -> Self {
        Self {
            start,
            length: end - start,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start.into()..(self.start + self.length).into()
    }

    pub fn end(&self) -> SpanIndex {
        self.start + self.length
    }

    pub fn merge(&self, other: &Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span::new(start, end)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Braces
    LeftBrace,
    RightBrace,
    // Miscellaneous
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Star,
    // Operators
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Slash,

    // Literals
    NumericLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordAnd,
    KeywordClass,
    KeywordElse,
    KeywordFalse,
    KeywordFor,
    KeywordFun,
    KeywordIf,
    KeywordNil,
    KeywordOr,
    KeywordPrint,
    KeywordReturn,
    KeywordSuper,
    KeywordThis,
    KeywordTrue,
    KeywordVar,
    KeywordWhile,

    // End of file.
    Eof,
}

impl TokenKind {
    /// The fixed source text of punctuation tokens, used in diagnostics.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::LeftParenthesis => "(",
            TokenKind::RightParenthesis => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            TokenKind::Semicolon => ";",
            TokenKind::Star => "*",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEqual => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEqual => ">=",
            TokenKind::Slash => "/",
            _ => return None,
        };
        Some(symbol)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::LeftParenthesis => "LEFT_PAREN",
            TokenKind::RightParenthesis => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Star => "STAR",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::LessThan => "LESS",
            TokenKind::LessThanEqual => "LESS_EQUAL",
            TokenKind::GreaterThan => "GREATER",
            TokenKind::GreaterThanEqual => "GREATER_EQUAL",
            TokenKind::Slash => "SLASH",
            TokenKind::StringLiteral => "STRING",
            TokenKind::NumericLiteral => "NUMBER",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::KeywordAnd => "AND",
            TokenKind::KeywordClass => "CLASS",
            TokenKind::KeywordElse => "ELSE",
            TokenKind::KeywordFalse => "FALSE",
            TokenKind::KeywordFor => "FOR",
            TokenKind::KeywordFun => "FUN",
            TokenKind::KeywordIf => "IF",
            TokenKind::KeywordNil => "NIL",
            TokenKind::KeywordOr => "OR",
            TokenKind::KeywordPrint => "PRINT",
            TokenKind::KeywordReturn => "RETURN",
            TokenKind::KeywordSuper => "SUPER",
            TokenKind::KeywordThis => "THIS",
            TokenKind::KeywordTrue => "TRUE",
            TokenKind::KeywordVar => "VAR",
            TokenKind::KeywordWhile => "WHILE",
            TokenKind::Eof => "EOF",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line the token starts on.
    pub line: u32,
}

impl Token {
    /// The raw source text of the token. Empty for the end-of-file marker.
    pub fn lexeme<'src>(&self, source: &'src str) -> &'src str {
        source.get(self.span.range()).unwrap_or("")
    }

    /// The normalized literal text of the token. Only numbers and strings have one.
    pub fn literal(&self, source: &str) -> Option<String> {
        let lexeme = self.lexeme(source);
        match self.kind {
            TokenKind::NumericLiteral => lexeme.parse::<f64>().ok().map(|v| format!("{v:?}")),
            TokenKind::StringLiteral => lexeme
                .get(1..lexeme.len().saturating_sub(1))
                .map(|v| v.to_string()),
            _ => None,
        }
    }
}
