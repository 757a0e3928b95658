pub mod error;
pub mod formatter;

use compact_str::{CompactString, CompactStringExt};
use error::RuntimeErrorKind;

/// Canonical text of a number.
///
/// Integral values have no fractional part (`6`, `-4`) and everything else uses the
/// shortest decimal that reads back as the same `f64` (`0.1`, `2.5`). Exponent notation
/// is never produced.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoxValue {
    Number(f64),
    String(CompactString),
    Nil,
    Bool(bool),
    /// Result of dividing a number by zero. Carried in-band instead of aborting.
    DivisionByZero,
}

impl std::fmt::Display for LoxValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", format_number(*v)),
            Self::String(v) => write!(f, "{v}"),
            Self::Nil => write!(f, "nil"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::DivisionByZero => write!(f, "ERROR"),
        }
    }
}

// Unary operators
impl LoxValue {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, LoxValue::Bool(false) | LoxValue::Nil)
    }

    pub fn logical_not(&self) -> bool {
        !self.is_truthy()
    }

    pub fn numeric_negate(&self) -> Result<LoxValue, RuntimeErrorKind> {
        match self {
            LoxValue::Number(v) => Ok(LoxValue::Number(-v)),
            v => Err(RuntimeErrorKind::NonNumeric(v.clone())),
        }
    }
}

impl LoxValue {
    // Arithmetic + string concatenation
    pub fn add(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => Ok(LoxValue::Number(lhs + rhs)),
            (LoxValue::String(lhs), LoxValue::String(rhs)) => {
                Ok(LoxValue::String([lhs, rhs].concat_compact()))
            }
            (lhs, rhs) => Err(RuntimeErrorKind::NonAddable(lhs.clone(), rhs.clone())),
        }
    }

    pub fn subtract(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.expect_numbers(other)?;
        Ok(LoxValue::Number(lhs - rhs))
    }

    pub fn multiply(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.expect_numbers(other)?;
        Ok(LoxValue::Number(lhs * rhs))
    }

    /// Dividing by zero is not an error. It produces [`LoxValue::DivisionByZero`].
    pub fn divide(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.expect_numbers(other)?;
        if rhs == 0.0 {
            Ok(LoxValue::DivisionByZero)
        } else {
            Ok(LoxValue::Number(lhs / rhs))
        }
    }

    // Comparison
    pub fn less_than(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.expect_numbers(other)?;
        Ok(LoxValue::Bool(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.expect_numbers(other)?;
        Ok(LoxValue::Bool(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.expect_numbers(other)?;
        Ok(LoxValue::Bool(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &LoxValue) -> Result<LoxValue, RuntimeErrorKind> {
        let (lhs, rhs) = self.expect_numbers(other)?;
        Ok(LoxValue::Bool(lhs >= rhs))
    }

    // Equality
    pub fn is_equal(&self, other: &LoxValue) -> bool {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => lhs == rhs,
            (LoxValue::String(lhs), LoxValue::String(rhs)) => lhs == rhs,
            (LoxValue::Nil, LoxValue::Nil) => true,
            (LoxValue::Bool(lhs), LoxValue::Bool(rhs)) => lhs == rhs,
            (LoxValue::DivisionByZero, LoxValue::DivisionByZero) => true,
            _ => false,
        }
    }

    pub fn is_not_equal(&self, other: &LoxValue) -> bool {
        !self.is_equal(other)
    }

    fn expect_numbers(&self, other: &LoxValue) -> Result<(f64, f64), RuntimeErrorKind> {
        match (self, other) {
            (LoxValue::Number(lhs), LoxValue::Number(rhs)) => Ok((*lhs, *rhs)),
            (lhs, rhs) => Err(RuntimeErrorKind::NonNumerics(lhs.clone(), rhs.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(v: &str) -> LoxValue {
        LoxValue::String(v.into())
    }

    #[test]
    fn numbers_use_minimal_text() {
        assert_eq!(LoxValue::Number(6.0).to_string(), "6");
        assert_eq!(LoxValue::Number(-4.0).to_string(), "-4");
        assert_eq!(LoxValue::Number(0.1).to_string(), "0.1");
        assert_eq!(LoxValue::Number(2.5).to_string(), "2.5");
        assert_eq!(LoxValue::Number(1e21).to_string(), "1000000000000000000000");
    }

    #[test]
    fn only_nil_and_false_are_falsy() {
        assert!(!LoxValue::Nil.is_truthy());
        assert!(!LoxValue::Bool(false).is_truthy());
        assert!(LoxValue::Number(0.0).is_truthy());
        assert!(string("").is_truthy());
        assert!(LoxValue::DivisionByZero.is_truthy());
    }

    #[test]
    fn add_requires_matching_variants() {
        assert_eq!(string("a").add(&string("b")), Ok(string("ab")));
        assert_eq!(
            LoxValue::Number(1.0).add(&LoxValue::Number(2.0)),
            Ok(LoxValue::Number(3.0))
        );
        assert!(matches!(
            LoxValue::Number(1.0).add(&string("a")),
            Err(RuntimeErrorKind::NonAddable(_, _))
        ));
    }

    #[test]
    fn division_by_zero_is_in_band() {
        let quotient = LoxValue::Number(1.0).divide(&LoxValue::Number(0.0));
        assert_eq!(quotient, Ok(LoxValue::DivisionByZero));
        assert_eq!(LoxValue::DivisionByZero.to_string(), "ERROR");
        assert!(matches!(
            LoxValue::DivisionByZero.add(&LoxValue::Number(1.0)),
            Err(RuntimeErrorKind::NonAddable(_, _))
        ));
        assert!(matches!(
            LoxValue::DivisionByZero.numeric_negate(),
            Err(RuntimeErrorKind::NonNumeric(_))
        ));
    }

    #[test]
    fn equality_never_coerces() {
        assert!(!LoxValue::Number(1.0).is_equal(&string("1")));
        assert!(!LoxValue::Nil.is_equal(&LoxValue::Bool(false)));
        assert!(LoxValue::Nil.is_equal(&LoxValue::Nil));
        assert!(string("a").is_not_equal(&string("b")));
        assert!(LoxValue::DivisionByZero.is_equal(&LoxValue::DivisionByZero));
        assert!(!LoxValue::DivisionByZero.is_equal(&LoxValue::Number(0.0)));
    }

    #[test]
    fn comparison_requires_numbers() {
        assert_eq!(
            LoxValue::Number(1.0).less_than(&LoxValue::Number(2.0)),
            Ok(LoxValue::Bool(true))
        );
        assert_eq!(
            LoxValue::Number(2.0).greater_than_or_equal(&LoxValue::Number(2.0)),
            Ok(LoxValue::Bool(true))
        );
        assert!(matches!(
            string("a").less_than_or_equal(&string("b")),
            Err(RuntimeErrorKind::NonNumerics(_, _))
        ));
    }
}
