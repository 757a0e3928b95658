use crate::lexer::TokenKind;

/// Binding power pair of `=`. Right associative and looser than every other operator.
pub const ASSIGNMENT_BINDING_POWER: (u8, u8) = (2, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl PrefixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(Self::Bang),
            TokenKind::Minus => Some(Self::Minus),
            _ => None,
        }
    }

    pub fn get_binding_power(&self) -> u8 {
        match self {
            // 1. Unary operators
            Self::Bang | Self::Minus => 11,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Bang => "!",
            Self::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Multiply,
    Divide,
    Add,
    Subtract,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    EqualEqual,
    BangEqual,
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Subtract),
            TokenKind::Star => Some(Self::Multiply),
            TokenKind::Slash => Some(Self::Divide),
            TokenKind::LessThan => Some(Self::LessThan),
            TokenKind::LessThanEqual => Some(Self::LessThanEqual),
            TokenKind::GreaterThan => Some(Self::GreaterThan),
            TokenKind::GreaterThanEqual => Some(Self::GreaterThanEqual),
            TokenKind::EqualEqual => Some(Self::EqualEqual),
            TokenKind::BangEqual => Some(Self::BangEqual),
            _ => None,
        }
    }

    /// Left associative operators bind slightly tighter on their right.
    pub fn get_binding_power(&self) -> (u8, u8) {
        match self {
            // 2. Multiplicative operators
            Self::Multiply | Self::Divide => (9, 10),
            // 3. Additive operators
            Self::Add | Self::Subtract => (7, 8),
            // 4. Comparison operators
            Self::LessThan | Self::LessThanEqual | Self::GreaterThan | Self::GreaterThanEqual => {
                (5, 6)
            }
            // 5. Equality operators
            Self::EqualEqual | Self::BangEqual => (3, 4),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
        }
    }
}
