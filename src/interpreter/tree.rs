use super::{ExecutionMode, SystemContext};
use crate::environment::Environment;
use crate::lexer::Span;
use crate::parser::expression::{
    Expression, ExpressionAtom, ExpressionAtomKind, ExpressionNode, ExpressionNodeRef,
    InfixOperator, PrefixOperator,
};
use crate::parser::statement::{
    BlockStatement, ExpressionStatement, IfStatement, PrintStatement, Program, Statement,
    VariableDecl,
};
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use crate::value::LoxValue;

/// Executes programs against one persistent global scope.
pub struct TreeWalkInterpreter {
    environment: Environment,
    interpreter: TreeWalkStatementInterpreter,
}

impl TreeWalkInterpreter {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            environment: Environment::new(),
            interpreter: TreeWalkStatementInterpreter { mode },
        }
    }

    pub fn get_environment(&self) -> &Environment {
        &self.environment
    }

    /// Runs every statement in order and stops at the first runtime error. Output written
    /// before the error stays in `context`.
    ///
    /// Returns the value of the last expression statement executed, or nil if there was none.
    pub fn run<C: SystemContext>(
        &mut self,
        program: &Program,
        context: &mut C,
    ) -> Result<LoxValue, RuntimeError> {
        tracing::debug!(statements = program.len(), mode = ?self.interpreter.mode, "running program");
        let mut last = None;
        for statement in program {
            if let Some(value) =
                self.interpreter
                    .interpret_statement(&mut self.environment, context, statement)?
            {
                last = Some(value);
            }
        }
        Ok(last.unwrap_or(LoxValue::Nil))
    }

    /// Evaluates a single expression against the global scope.
    pub fn evaluate(&mut self, expr: &Expression) -> Result<LoxValue, RuntimeError> {
        self.interpreter.evaluate(&mut self.environment, expr)
    }
}

struct TreeWalkStatementInterpreter {
    mode: ExecutionMode,
}

// Statement interpreter
impl TreeWalkStatementInterpreter {
    /// Executes one statement. Yields the value of the last expression statement it ran.
    fn interpret_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        context: &mut C,
        statement: &Statement,
    ) -> Result<Option<LoxValue>, RuntimeError> {
        match statement {
            Statement::VariableDecl(decl) => {
                self.interpret_variable_declaration(environment, decl)
            }
            Statement::Expression(stmt) => {
                self.interpret_expression_statement(environment, context, stmt)
            }
            Statement::Print(stmt) => self.interpret_print_statement(environment, context, stmt),
            Statement::Block(stmt) => self.interpret_block_statement(environment, context, stmt),
            Statement::If(stmt) => self.interpret_if_statement(environment, context, stmt),
        }
    }

    fn interpret_variable_declaration(
        &self,
        environment: &mut Environment,
        decl: &VariableDecl,
    ) -> Result<Option<LoxValue>, RuntimeError> {
        let initial = match decl.initial {
            Some(ref expr) => self.evaluate(environment, expr)?,
            None => LoxValue::Nil,
        };
        tracing::trace!(name = %decl.name, value = %initial, "declare");
        environment.declare(&decl.name.name, initial);
        Ok(None)
    }

    fn interpret_expression_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        context: &mut C,
        stmt: &ExpressionStatement,
    ) -> Result<Option<LoxValue>, RuntimeError> {
        let value = self.evaluate(environment, &stmt.expr)?;
        if self.mode == ExecutionMode::Evaluate {
            context.writeln(&value.to_string());
        }
        Ok(Some(value))
    }

    fn interpret_print_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        context: &mut C,
        stmt: &PrintStatement,
    ) -> Result<Option<LoxValue>, RuntimeError> {
        let value = self.evaluate(environment, &stmt.expr)?;
        context.writeln(&value.to_string());
        Ok(None)
    }

    fn interpret_block_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        context: &mut C,
        stmt: &BlockStatement,
    ) -> Result<Option<LoxValue>, RuntimeError> {
        environment.with_scope(|inner| {
            let mut last = None;
            for statement in stmt.body.iter() {
                if let Some(value) = self.interpret_statement(inner, context, statement)? {
                    last = Some(value);
                }
            }
            Ok(last)
        })
    }

    fn interpret_if_statement<C: SystemContext>(
        &self,
        environment: &mut Environment,
        context: &mut C,
        stmt: &IfStatement,
    ) -> Result<Option<LoxValue>, RuntimeError> {
        let condition = self.evaluate(environment, &stmt.condition)?;
        if condition.is_truthy() {
            self.interpret_statement(environment, context, &stmt.success)
        } else if let Some(ref failure) = stmt.failure {
            self.interpret_statement(environment, context, failure)
        } else {
            Ok(None)
        }
    }
}

// Expression evaluator
impl TreeWalkStatementInterpreter {
    fn evaluate(
        &self,
        environment: &mut Environment,
        expr: &Expression,
    ) -> Result<LoxValue, RuntimeError> {
        self.evaluate_expression_node(environment, expr, expr.get_root_ref())
    }

    fn evaluate_expression_node(
        &self,
        environment: &mut Environment,
        expr: &Expression,
        node: ExpressionNodeRef,
    ) -> Result<LoxValue, RuntimeError> {
        let node = expr
            .get_node(node)
            .expect("Node refs stored in a tree point into that tree.");
        match node {
            ExpressionNode::Atom(atom) => self.evaluate_atom(environment, atom),
            ExpressionNode::Group { inner, .. } => {
                self.evaluate_expression_node(environment, expr, *inner)
            }
            ExpressionNode::Prefix { operator, rhs, span } => {
                let rhs = self.evaluate_expression_node(environment, expr, *rhs)?;
                self.evaluate_prefix(*operator, &rhs, *span)
            }
            ExpressionNode::Infix {
                operator,
                lhs,
                rhs,
                span,
            } => {
                let lhs = self.evaluate_expression_node(environment, expr, *lhs)?;
                let rhs = self.evaluate_expression_node(environment, expr, *rhs)?;
                self.evaluate_infix(*operator, &lhs, &rhs, *span)
            }
            ExpressionNode::InfixAssignment { lhs, rhs } => {
                let value = self.evaluate_expression_node(environment, expr, *rhs)?;
                environment
                    .assign(&lhs.name, value.clone())
                    .map_err(|kind| RuntimeError {
                        kind,
                        span: lhs.span,
                    })?;
                Ok(value)
            }
        }
    }

    fn evaluate_atom(
        &self,
        environment: &Environment,
        atom: &ExpressionAtom,
    ) -> Result<LoxValue, RuntimeError> {
        let value = match atom.kind {
            ExpressionAtomKind::Number(v) => LoxValue::Number(v),
            ExpressionAtomKind::Bool(v) => LoxValue::Bool(v),
            ExpressionAtomKind::Nil => LoxValue::Nil,
            ExpressionAtomKind::StringLiteral(ref v) => LoxValue::String(v.clone()),
            ExpressionAtomKind::Identifier(ref name) => {
                environment.access(name).map_err(|kind| RuntimeError {
                    kind,
                    span: atom.span,
                })?
            }
        };
        Ok(value)
    }

    fn evaluate_prefix(
        &self,
        operator: PrefixOperator,
        rhs: &LoxValue,
        span: Span,
    ) -> Result<LoxValue, RuntimeError> {
        match operator {
            PrefixOperator::Bang => Ok(LoxValue::Bool(rhs.logical_not())),
            PrefixOperator::Minus => rhs
                .numeric_negate()
                .map_err(|kind| RuntimeError { kind, span }),
        }
    }

    fn evaluate_infix(
        &self,
        operator: InfixOperator,
        lhs: &LoxValue,
        rhs: &LoxValue,
        span: Span,
    ) -> Result<LoxValue, RuntimeError> {
        let result: Result<LoxValue, RuntimeErrorKind> = match operator {
            InfixOperator::Add => lhs.add(rhs),
            InfixOperator::Subtract => lhs.subtract(rhs),
            InfixOperator::Multiply => lhs.multiply(rhs),
            InfixOperator::Divide => lhs.divide(rhs),
            InfixOperator::LessThan => lhs.less_than(rhs),
            InfixOperator::LessThanEqual => lhs.less_than_or_equal(rhs),
            InfixOperator::GreaterThan => lhs.greater_than(rhs),
            InfixOperator::GreaterThanEqual => lhs.greater_than_or_equal(rhs),
            InfixOperator::EqualEqual => Ok(LoxValue::Bool(lhs.is_equal(rhs))),
            InfixOperator::BangEqual => Ok(LoxValue::Bool(lhs.is_not_equal(rhs))),
        };
        result.map_err(|kind| RuntimeError { kind, span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::BufferedContext;
    use crate::parser::Parser;

    fn run(source: &str, mode: ExecutionMode) -> (String, Result<LoxValue, RuntimeError>) {
        let program = Parser::from_source(source)
            .expect("Test sources are lexically valid.")
            .parse()
            .expect("Test sources parse.");
        let mut interpreter = TreeWalkInterpreter::new(mode);
        let mut context = BufferedContext::new();
        let result = interpreter.run(&program, &mut context);
        (context.into_data(), result)
    }

    #[test]
    fn block_shadowing_restores_outer_binding() {
        let (output, result) = run(
            "var x = 1; { var x = 2; print x; } print x;",
            ExecutionMode::Script,
        );
        assert_eq!(output, "2\n1\n");
        assert_eq!(result, Ok(LoxValue::Nil));
    }

    #[test]
    fn evaluate_mode_echoes_expression_statements() {
        let (output, result) = run("1 + 2; var a = 3; a = 4; a", ExecutionMode::Evaluate);
        assert_eq!(output, "3\n4\n4\n");
        assert_eq!(result, Ok(LoxValue::Number(4.0)));
    }

    #[test]
    fn script_mode_only_prints() {
        let (output, result) = run("1 + 2; print \"a\" + \"b\"; 7;", ExecutionMode::Script);
        assert_eq!(output, "ab\n");
        assert_eq!(result, Ok(LoxValue::Number(7.0)));
    }

    #[test]
    fn assignment_chains_and_yields_value() {
        let (output, _) = run("var a; var b; a = b = 3; print a; print b;", ExecutionMode::Script);
        assert_eq!(output, "3\n3\n");
    }

    #[test]
    fn undefined_assignment_is_a_runtime_error() {
        let (_, result) = run("x = 1;", ExecutionMode::Script);
        let error = result.unwrap_err();
        assert_eq!(error.kind, RuntimeErrorKind::UndefinedVariable("x".into()));
    }

    #[test]
    fn else_branch_runs_when_condition_is_falsy() {
        let (output, _) = run(
            "if (false) print 1; else print 2; if (nil) print 3; if (0) print 4;",
            ExecutionMode::Script,
        );
        assert_eq!(output, "2\n4\n");
    }

    #[test]
    fn output_before_error_is_kept() {
        let (output, result) = run("print 1; print -\"a\"; print 2;", ExecutionMode::Script);
        assert_eq!(output, "1\n");
        assert!(matches!(
            result.map_err(|e| e.kind),
            Err(RuntimeErrorKind::NonNumeric(_))
        ));
    }

    #[test]
    fn division_by_zero_does_not_abort() {
        let (output, result) = run("print 1 / 0; print 2;", ExecutionMode::Script);
        assert_eq!(output, "ERROR\n2\n");
        assert!(result.is_ok());
    }

    #[test]
    fn failing_block_leaves_global_scope_active() {
        let mut interpreter = TreeWalkInterpreter::new(ExecutionMode::Script);
        let mut context = BufferedContext::new();
        let program = Parser::from_source("var g = 1; { var l = 2; { print missing; } }")
            .expect("Lexically valid.")
            .parse()
            .expect("Parses.");
        assert!(interpreter.run(&program, &mut context).is_err());
        assert_eq!(interpreter.get_environment().depth(), 1);

        let program = Parser::from_source("print g; l;")
            .expect("Lexically valid.")
            .parse()
            .expect("Parses.");
        let error = interpreter.run(&program, &mut context).unwrap_err();
        assert_eq!(context.get_data(), "1\n");
        assert_eq!(error.kind, RuntimeErrorKind::UndefinedVariable("l".into()));
    }
}
