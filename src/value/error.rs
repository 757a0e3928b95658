use super::LoxValue;
use crate::lexer::Span;
use crate::string::IdentName;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    NonNumeric(LoxValue),
    #[error("Operands must be numbers.")]
    NonNumerics(LoxValue, LoxValue),
    #[error("Operands must be two numbers or two strings.")]
    NonAddable(LoxValue, LoxValue),
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(IdentName),
}

/// A fatal evaluation error. `span` points at the operator or name that failed.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::NonNumeric(_) => "RT001",
            RuntimeErrorKind::NonNumerics(_, _) => "RT002",
            RuntimeErrorKind::NonAddable(_, _) => "RT003",
            RuntimeErrorKind::UndefinedVariable(_) => "RT004",
        }
    }
}
