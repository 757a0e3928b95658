use super::{InfixOperator, PrefixOperator};
use crate::lexer::Span;
use crate::string::Ident;
use compact_str::CompactString;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionAtomKind {
    Number(f64),
    Bool(bool),
    Nil,
    Identifier(CompactString),
    StringLiteral(CompactString),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionAtom {
    pub kind: ExpressionAtomKind,
    pub span: Span,
}

/// Index of a node inside its owning [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionNodeRef(u32);

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Atom(ExpressionAtom),
    Group {
        inner: ExpressionNodeRef,
        span: Span,
    },
    Prefix {
        operator: PrefixOperator,
        rhs: ExpressionNodeRef,
        span: Span,
    },
    Infix {
        operator: InfixOperator,
        lhs: ExpressionNodeRef,
        rhs: ExpressionNodeRef,
        span: Span,
    },
    InfixAssignment {
        lhs: Ident,
        rhs: ExpressionNodeRef,
    },
}

impl ExpressionNode {
    /// The name this node can be assigned to, if it is a bare variable reference.
    pub fn get_l_value(&self) -> Option<Ident> {
        match self {
            ExpressionNode::Atom(ExpressionAtom {
                kind: ExpressionAtomKind::Identifier(name),
                span,
            }) => Some(Ident {
                name: name.clone(),
                span: *span,
            }),
            _ => None,
        }
    }

    /// The span used when reporting errors raised by this node.
    /// For operators this is the operator token itself.
    pub fn get_span(&self) -> Span {
        match self {
            ExpressionNode::Atom(atom) => atom.span,
            ExpressionNode::Group { span, .. }
            | ExpressionNode::Prefix { span, .. }
            | ExpressionNode::Infix { span, .. } => *span,
            ExpressionNode::InfixAssignment { lhs, .. } => lhs.span,
        }
    }
}

/// Node storage while an expression is still being parsed.
#[derive(Debug, Clone, Default)]
pub struct IncompleteExpression {
    nodes: Vec<ExpressionNode>,
    /// Height of the subtree rooted at each node. Atoms have height 0.
    heights: Vec<usize>,
}

impl IncompleteExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: ExpressionNode) -> ExpressionNodeRef {
        let height = match &node {
            ExpressionNode::Atom(_) => 0,
            ExpressionNode::Group { inner: child, .. }
            | ExpressionNode::Prefix { rhs: child, .. }
            | ExpressionNode::InfixAssignment { rhs: child, .. } => self.height(*child) + 1,
            ExpressionNode::Infix { lhs, rhs, .. } => {
                self.height(*lhs).max(self.height(*rhs)) + 1
            }
        };
        self.nodes.push(node);
        self.heights.push(height);
        ExpressionNodeRef(self.nodes.len() as u32 - 1)
    }

    pub fn height(&self, node: ExpressionNodeRef) -> usize {
        self.heights.get(node.0 as usize).copied().unwrap_or(0)
    }

    pub fn get_node(&self, node: ExpressionNodeRef) -> Option<&ExpressionNode> {
        self.nodes.get(node.0 as usize)
    }
}

/// An expression tree stored as a flat arena. Children always precede their parents.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    nodes: Vec<ExpressionNode>,
    root: ExpressionNodeRef,
}

impl Expression {
    pub fn new(tree: IncompleteExpression, root: ExpressionNodeRef) -> Option<Self> {
        if !(0..tree.nodes.len()).contains(&(root.0 as usize)) {
            None
        } else {
            Some(Self {
                nodes: tree.nodes,
                root,
            })
        }
    }

    pub fn get_root_ref(&self) -> ExpressionNodeRef {
        self.root
    }

    pub fn get_node(&self, node: ExpressionNodeRef) -> Option<&ExpressionNode> {
        self.nodes.get(node.0 as usize)
    }

    pub fn get_span(&self, node: ExpressionNodeRef) -> Option<Span> {
        self.get_node(node).map(ExpressionNode::get_span)
    }
}
