mod error;
pub mod expression;
pub mod formatter;
pub mod statement;

pub use error::{ParserError, ParserErrorKind};
use expression::{
    Expression, ExpressionAtom, ExpressionAtomKind, ExpressionNode, ExpressionNodeRef,
    IncompleteExpression, InfixOperator, PrefixOperator, ASSIGNMENT_BINDING_POWER,
};
use statement::{
    BlockStatement, ExpressionStatement, IfStatement, PrintStatement, Program, Statement,
    VariableDecl,
};

use crate::lexer::{Lexer, LexicalError, Span, SpanIndex, Token, TokenKind};
use crate::string::Ident;

/// Deepest nesting of statements and expressions the parser accepts. Both the parser and
/// the interpreter recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a parser over an already scanned token stream. The stream must end with
    /// [`TokenKind::Eof`].
    pub fn new(source: &'src str, mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let line = tokens.last().map_or(1, |t| t.line);
            let end = SpanIndex::from(source.len());
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end),
                line,
            });
        }
        Self {
            source,
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Scans `source` and creates a parser over it, or returns every lexical error found.
    pub fn from_source(source: &'src str) -> Result<Self, Vec<LexicalError>> {
        let (tokens, errors) = Lexer::new(source).tokenize();
        if errors.is_empty() {
            Ok(Self::new(source, tokens))
        } else {
            Err(errors)
        }
    }

    fn peek(&self) -> &Token {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn next_token(&mut self) -> Token {
        let token = *self.peek();
        if !matches!(token.kind, TokenKind::Eof) {
            self.position += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn expect(&mut self, expected: TokenKind, after: &'static str) -> Result<Token, ParserError> {
        if self.peek().kind != expected {
            let token = *self.peek();
            Err(ParserError {
                kind: ParserErrorKind::UnexpectedToken {
                    actual: token.kind,
                    expected,
                    after,
                },
                token,
            })
        } else {
            Ok(self.next_token())
        }
    }

    fn eat_if(&mut self, next: TokenKind) -> Option<Token> {
        if self.peek().kind != next {
            None
        } else {
            Some(self.next_token())
        }
    }

    fn too_deep(&self) -> ParserError {
        ParserError {
            kind: ParserErrorKind::TooDeep,
            token: *self.peek(),
        }
    }

    /// Runs `parse` one nesting level deeper, failing once [`MAX_NESTING_DEPTH`] is reached.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParserError>,
    ) -> Result<T, ParserError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        let mut tree = IncompleteExpression::new();
        let root = self.parse_expression_pratt(0, &mut tree)?;

        Ok(Expression::new(tree, root)
            .expect("Root was obtained from the tree itself so it must be valid."))
    }

    fn expect_left_expression(
        &mut self,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParserError> {
        let token = self.next_token();
        let lexeme = token.lexeme(self.source);
        let span = token.span;

        let atom = move |kind: ExpressionAtomKind| ExpressionNode::Atom(ExpressionAtom { kind, span });

        let node = match token.kind {
            TokenKind::NumericLiteral => {
                let value = lexeme
                    .parse()
                    .expect("Numeric literal tokens are valid `f64`");
                tree.push(atom(ExpressionAtomKind::Number(value)))
            }
            TokenKind::StringLiteral => {
                let value = lexeme
                    .get(1..lexeme.len() - 1)
                    .expect("String literal tokens are at least length 2.");
                tree.push(atom(ExpressionAtomKind::StringLiteral(value.into())))
            }
            TokenKind::Ident => tree.push(atom(ExpressionAtomKind::Identifier(lexeme.into()))),
            TokenKind::KeywordNil => tree.push(atom(ExpressionAtomKind::Nil)),
            TokenKind::KeywordTrue => tree.push(atom(ExpressionAtomKind::Bool(true))),
            TokenKind::KeywordFalse => tree.push(atom(ExpressionAtomKind::Bool(false))),
            // Prefix operators
            TokenKind::Minus | TokenKind::Bang => {
                let operator = PrefixOperator::from_token(token.kind)
                    .expect("Just matched a prefix operator token.");
                let rhs = self.parse_expression_pratt(operator.get_binding_power(), tree)?;
                tree.push(ExpressionNode::Prefix { operator, rhs, span })
            }
            // Bracketed expression
            TokenKind::LeftParenthesis => {
                let inner = self.parse_expression_pratt(0, tree)?;
                let closing = self.expect(TokenKind::RightParenthesis, "expression")?;
                tree.push(ExpressionNode::Group {
                    inner,
                    span: span.merge(&closing.span),
                })
            }
            kind => {
                return Err(ParserError {
                    kind: ParserErrorKind::NonExpression(kind),
                    token,
                })
            }
        };
        Ok(node)
    }

    fn parse_expression_pratt(
        &mut self,
        min_bp: u8,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParserError> {
        self.nested(|parser| parser.parse_expression_operators(min_bp, tree))
    }

    fn parse_expression_operators(
        &mut self,
        min_bp: u8,
        tree: &mut IncompleteExpression,
    ) -> Result<ExpressionNodeRef, ParserError> {
        let mut lhs = self.expect_left_expression(tree)?;

        loop {
            let kind = self.peek().kind;

            if matches!(kind, TokenKind::Equal) {
                let (lbp, rbp) = ASSIGNMENT_BINDING_POWER;
                if lbp < min_bp {
                    break;
                }
                let equals = self.next_token();
                let Some(target) = tree.get_node(lhs).and_then(ExpressionNode::get_l_value)
                else {
                    return Err(ParserError {
                        kind: ParserErrorKind::InvalidLValue,
                        token: equals,
                    });
                };
                let rhs = self.parse_expression_pratt(rbp, tree)?;
                lhs = tree.push(ExpressionNode::InfixAssignment { lhs: target, rhs });
                continue;
            }

            if let Some(operator) = InfixOperator::from_token(kind) {
                let (lbp, rbp) = operator.get_binding_power();
                if lbp < min_bp {
                    break;
                }
                let operator_token = self.next_token();
                let rhs = self.parse_expression_pratt(rbp, tree)?;
                lhs = tree.push(ExpressionNode::Infix {
                    operator,
                    lhs,
                    rhs,
                    span: operator_token.span,
                });
                // Left associative chains grow the tree without recursing here.
                if tree.height(lhs) + self.depth > MAX_NESTING_DEPTH {
                    return Err(ParserError {
                        kind: ParserErrorKind::TooDeep,
                        token: operator_token,
                    });
                }
                continue;
            }

            break;
        }
        Ok(lhs)
    }
}

// Parse program/statements
impl<'src> Parser<'src> {
    /// Parses the whole token stream, stopping at the first syntax error.
    ///
    /// The semicolon after the last top level expression statement may be omitted, so a
    /// file holding a single bare expression is a valid program.
    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_statement(true)?);
        }
        tracing::debug!(statements = statements.len(), "parsed program");
        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self, top_level: bool) -> Result<Statement, ParserError> {
        let Token { kind, line, .. } = *self.peek();
        tracing::trace!(%kind, line, "parsing statement");
        match kind {
            TokenKind::KeywordVar => self.parse_variable_declaration(),
            TokenKind::KeywordPrint => {
                let _ = self.next_token();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "value")?;
                Ok(Statement::Print(PrintStatement { expr }))
            }
            TokenKind::LeftBrace => self.nested(Self::parse_block),
            TokenKind::KeywordIf => self.nested(Self::parse_if_statement),
            _ => {
                let expr = self.parse_expression()?;
                if !(top_level && self.is_at_end()) {
                    self.expect(TokenKind::Semicolon, "expression")?;
                }
                Ok(Statement::Expression(ExpressionStatement { expr }))
            }
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<Statement, ParserError> {
        let _ = self.next_token();
        let name_token = self.next_token();
        if name_token.kind != TokenKind::Ident {
            return Err(ParserError {
                kind: ParserErrorKind::NonIdentifier(name_token.kind),
                token: name_token,
            });
        }
        let name = Ident {
            name: name_token.lexeme(self.source).into(),
            span: name_token.span,
        };

        let initial = match self.eat_if(TokenKind::Equal) {
            Some(_) => Some(self.parse_expression()?),
            None => None,
        };
        self.expect(TokenKind::Semicolon, "variable declaration")?;

        Ok(Statement::VariableDecl(VariableDecl { name, initial }))
    }

    fn parse_block(&mut self) -> Result<Statement, ParserError> {
        let _ = self.next_token();
        let mut body = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RightBrace | TokenKind::Eof) {
            body.push(self.parse_statement(false)?);
        }
        self.expect(TokenKind::RightBrace, "block")?;
        Ok(Statement::Block(BlockStatement { body }))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParserError> {
        let _ = self.next_token();
        self.expect(TokenKind::LeftParenthesis, "'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParenthesis, "if condition")?;

        let success = Box::new(self.parse_statement(false)?);
        let failure = match self.eat_if(TokenKind::KeywordElse) {
            Some(_) => Some(Box::new(self.parse_statement(false)?)),
            None => None,
        };

        Ok(Statement::If(IfStatement {
            condition,
            success,
            failure,
        }))
    }
}
