use super::{
    expression::{Expression, ExpressionAtom, ExpressionAtomKind, ExpressionNode, ExpressionNodeRef},
    statement::{Program, Statement},
    ParserError, ParserErrorKind, MAX_NESTING_DEPTH,
};
use crate::lexer::TokenKind;
use crate::value::format_number;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";
const VALID_REF_MSG: &str = "Node refs stored in a tree point into that tree.";

pub trait ExpressionFormatter {
    fn format(&self, tree: &Expression) -> String;
}

pub trait ProgramFormatter {
    fn format_statement(&self, statement: &Statement) -> String;

    /// One line per top level statement.
    fn format_program(&self, program: &Program) -> String {
        program
            .iter()
            .map(|statement| self.format_statement(statement))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub trait ParserFormatter {
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugFormatter;

impl ExpressionFormatter for DebugFormatter {
    fn format(&self, tree: &Expression) -> String {
        format!("{tree:?}")
    }
}

impl ProgramFormatter for DebugFormatter {
    fn format_statement(&self, statement: &Statement) -> String {
        format!("{statement:?}")
    }
}

impl ParserFormatter for DebugFormatter {
    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Renders trees as parenthesized prefix forms such as `(+ 1 (group (* 2 3)))`.
pub struct SExpressionFormatter;

impl SExpressionFormatter {
    fn format_atom(atom: &ExpressionAtom) -> String {
        match atom.kind {
            ExpressionAtomKind::Number(v) => format_number(v),
            ExpressionAtomKind::Bool(v) => format!("{v}"),
            ExpressionAtomKind::Nil => "nil".into(),
            ExpressionAtomKind::Identifier(ref name) => name.to_string(),
            ExpressionAtomKind::StringLiteral(ref v) => v.to_string(),
        }
    }

    fn format_node(tree: &Expression, node: ExpressionNodeRef) -> String {
        match tree.get_node(node).expect(VALID_REF_MSG) {
            ExpressionNode::Atom(atom) => Self::format_atom(atom),
            ExpressionNode::Group { inner, .. } => {
                format!("(group {})", Self::format_node(tree, *inner))
            }
            ExpressionNode::Prefix { operator, rhs, .. } => {
                format!("({} {})", operator.symbol(), Self::format_node(tree, *rhs))
            }
            ExpressionNode::Infix {
                operator, lhs, rhs, ..
            } => format!(
                "({} {} {})",
                operator.symbol(),
                Self::format_node(tree, *lhs),
                Self::format_node(tree, *rhs),
            ),
            ExpressionNode::InfixAssignment { lhs, rhs } => {
                format!("(= {} {})", lhs.name, Self::format_node(tree, *rhs))
            }
        }
    }
}

impl ExpressionFormatter for SExpressionFormatter {
    fn format(&self, tree: &Expression) -> String {
        Self::format_node(tree, tree.get_root_ref())
    }
}

impl ProgramFormatter for SExpressionFormatter {
    fn format_statement(&self, statement: &Statement) -> String {
        match statement {
            Statement::Expression(stmt) => self.format(&stmt.expr),
            Statement::Print(stmt) => format!("(print {})", self.format(&stmt.expr)),
            Statement::VariableDecl(decl) => match decl.initial {
                Some(ref initial) => format!("(var {} {})", decl.name, self.format(initial)),
                None => format!("(var {})", decl.name),
            },
            Statement::Block(block) => {
                let mut buffer = String::from("(block");
                for inner in block.body.iter() {
                    buffer.push(' ');
                    buffer.push_str(&self.format_statement(inner));
                }
                buffer.push(')');
                buffer
            }
            Statement::If(stmt) => {
                let condition = self.format(&stmt.condition);
                let success = self.format_statement(&stmt.success);
                match stmt.failure {
                    Some(ref failure) => format!(
                        "(if {condition} {success} {})",
                        self.format_statement(failure)
                    ),
                    None => format!("(if {condition} {success})"),
                }
            }
        }
    }
}

/// Renders trees back into source text that parses to the same tree.
///
/// No parentheses are added beyond the groups already present, so operator placement
/// relies entirely on precedence and associativity.
pub struct SourceFormatter;

impl SourceFormatter {
    fn format_node(tree: &Expression, node: ExpressionNodeRef) -> String {
        match tree.get_node(node).expect(VALID_REF_MSG) {
            ExpressionNode::Atom(ExpressionAtom {
                kind: ExpressionAtomKind::StringLiteral(v),
                ..
            }) => format!("\"{v}\""),
            ExpressionNode::Atom(atom) => SExpressionFormatter::format_atom(atom),
            ExpressionNode::Group { inner, .. } => format!("({})", Self::format_node(tree, *inner)),
            ExpressionNode::Prefix { operator, rhs, .. } => {
                format!("{}{}", operator.symbol(), Self::format_node(tree, *rhs))
            }
            ExpressionNode::Infix {
                operator, lhs, rhs, ..
            } => format!(
                "{} {} {}",
                Self::format_node(tree, *lhs),
                operator.symbol(),
                Self::format_node(tree, *rhs),
            ),
            ExpressionNode::InfixAssignment { lhs, rhs } => {
                format!("{} = {}", lhs.name, Self::format_node(tree, *rhs))
            }
        }
    }
}

impl ExpressionFormatter for SourceFormatter {
    fn format(&self, tree: &Expression) -> String {
        Self::format_node(tree, tree.get_root_ref())
    }
}

impl ProgramFormatter for SourceFormatter {
    fn format_statement(&self, statement: &Statement) -> String {
        match statement {
            Statement::Expression(stmt) => format!("{};", self.format(&stmt.expr)),
            Statement::Print(stmt) => format!("print {};", self.format(&stmt.expr)),
            Statement::VariableDecl(decl) => match decl.initial {
                Some(ref initial) => format!("var {} = {};", decl.name, self.format(initial)),
                None => format!("var {};", decl.name),
            },
            Statement::Block(block) => {
                let mut buffer = String::from("{");
                for inner in block.body.iter() {
                    buffer.push(' ');
                    buffer.push_str(&self.format_statement(inner));
                }
                buffer.push_str(" }");
                buffer
            }
            Statement::If(stmt) => {
                let mut buffer = format!(
                    "if ({}) {}",
                    self.format(&stmt.condition),
                    self.format_statement(&stmt.success)
                );
                if let Some(ref failure) = stmt.failure {
                    buffer.push_str(" else ");
                    buffer.push_str(&self.format_statement(failure));
                }
                buffer
            }
        }
    }
}

/// Reports syntax errors as `[line N] Error at 'lexeme': message`.
pub struct BasicParserFormatter<'src> {
    text: &'src str,
}

impl<'src> BasicParserFormatter<'src> {
    pub fn new(text: &'src str) -> Self {
        Self { text }
    }
}

impl<'src> ParserFormatter for BasicParserFormatter<'src> {
    fn format_error(&self, error: &ParserError) -> String {
        let line = error.line();
        let location = match error.token.kind {
            TokenKind::Eof => String::from("end"),
            _ => format!("'{}'", error.token.lexeme(self.text)),
        };
        format!("[line {line}] Error at {location}: {}", error.kind)
    }
}

pub struct PrettyParserFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyParserFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ParserFormatter for PrettyParserFormatter<'src> {
    fn format_error(&self, error: &ParserError) -> String {
        let path = self.path.to_string_lossy();
        let path = path.as_ref();
        let span = error.token.span.range();
        let label = match error.kind {
            ParserErrorKind::UnexpectedToken {
                actual, expected, ..
            } => format!(
                "Expected {} but got {}",
                expected.fg(Color::BrightCyan),
                actual.fg(Color::BrightRed)
            ),
            ParserErrorKind::NonExpression(kind) => {
                format!("{} can not start an expression", kind.fg(Color::BrightRed))
            }
            ParserErrorKind::NonIdentifier(kind) => {
                format!("{} is not a variable name", kind.fg(Color::BrightRed))
            }
            ParserErrorKind::InvalidLValue => {
                String::from("Only a bare variable can be assigned to")
            }
            ParserErrorKind::TooDeep => format!(
                "Nested more than {} levels deep",
                MAX_NESTING_DEPTH.fg(Color::BrightCyan)
            ),
        };

        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span.clone()))
            .with_code(error.code())
            .with_message(error.kind.to_string())
            .with_label(
                Label::new((path, span))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
