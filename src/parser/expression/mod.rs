mod operator;
mod tree;

pub use operator::{InfixOperator, PrefixOperator, ASSIGNMENT_BINDING_POWER};
pub use tree::{
    Expression, ExpressionAtom, ExpressionAtomKind, ExpressionNode, ExpressionNodeRef,
    IncompleteExpression,
};
