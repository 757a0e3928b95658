use super::cursor::SourceChar;
use super::token::{Span, SpanIndex, Token, TokenKind, KEYWORD_HASHMAP};
use super::{LexicalError, LexicalErrorKind};

/// Where the source ends, used to close any token still being built.
#[derive(Debug, Clone, Copy)]
pub struct SourceEnd {
    pub offset: SpanIndex,
    pub line: u32,
}

#[derive(Debug)]
pub enum LexerStateTransition {
    Stay,
    ChangeState(LexerState),
    ChangeStateAndEmit {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
    },
    ChangeStateAndEmitAndPutBack {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
        put_back: SourceChar,
    },
    ChangeStateAndEmitAndPutBackTwo {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
        put_back: (SourceChar, SourceChar),
    },
}

#[derive(Debug, Default)]
pub enum LexerState {
    #[default]
    Normal,
    Operator(SourceChar),
    Comment,
    Ident(SourceChar),
    Number(NumberState),
    String(SourceChar),
}

#[derive(Debug, Clone, Copy)]
pub struct NumberState {
    start: SourceChar,
    /// The decimal point, if one has been seen.
    dot: Option<SourceChar>,
    /// Whether any digit followed the decimal point.
    has_fraction: bool,
}

fn emit(new_state: LexerState, kind: TokenKind, span: Span, line: u32) -> LexerStateTransition {
    LexerStateTransition::ChangeStateAndEmit {
        new_state,
        token_or_error: Ok(Token { kind, span, line }),
    }
}

fn single(c: &SourceChar) -> Span {
    Span::new(c.offset, c.next_offset())
}

impl LexerState {
    pub fn execute(
        &self,
        source: &str,
        next_char: Option<SourceChar>,
        end: SourceEnd,
    ) -> LexerStateTransition {
        match self {
            LexerState::Normal => Self::execute_normal(next_char, end),
            LexerState::Operator(first) => Self::execute_operator(first, next_char),
            LexerState::Comment => Self::execute_comment(next_char),
            LexerState::Ident(start) => Self::execute_ident(source, start, next_char, end),
            LexerState::Number(state) => Self::execute_number(state, next_char, end),
            LexerState::String(start) => Self::execute_string(start, next_char, end),
        }
    }

    fn execute_normal(next_char: Option<SourceChar>, end: SourceEnd) -> LexerStateTransition {
        let Some(c) = next_char else {
            return emit(
                LexerState::Normal,
                TokenKind::Eof,
                Span::new(end.offset, end.offset),
                end.line,
            );
        };

        let just = |kind: TokenKind| emit(LexerState::Normal, kind, single(&c), c.line);

        match c.value {
            // Single character tokens
            '(' => just(TokenKind::LeftParenthesis),
            ')' => just(TokenKind::RightParenthesis),
            '{' => just(TokenKind::LeftBrace),
            '}' => just(TokenKind::RightBrace),
            ',' => just(TokenKind::Comma),
            '.' => just(TokenKind::Dot),
            '-' => just(TokenKind::Minus),
            '+' => just(TokenKind::Plus),
            ';' => just(TokenKind::Semicolon),
            '*' => just(TokenKind::Star),
            // Possibly two character tokens or comments
            '=' | '!' | '<' | '>' | '/' => LexerStateTransition::ChangeState(LexerState::Operator(c)),
            '"' => LexerStateTransition::ChangeState(LexerState::String(c)),
            '0'..='9' => LexerStateTransition::ChangeState(LexerState::Number(NumberState {
                start: c,
                dot: None,
                has_fraction: false,
            })),
            'a'..='z' | 'A'..='Z' | '_' => LexerStateTransition::ChangeState(LexerState::Ident(c)),
            ' ' | '\t' | '\r' | '\n' => LexerStateTransition::Stay,
            other => LexerStateTransition::ChangeStateAndEmit {
                new_state: LexerState::Normal,
                token_or_error: Err(LexicalError {
                    kind: LexicalErrorKind::Unrecognized(other),
                    span: single(&c),
                    line: c.line,
                }),
            },
        }
    }

    fn execute_operator(first: &SourceChar, next_char: Option<SourceChar>) -> LexerStateTransition {
        let single_kind = match first.value {
            '=' => TokenKind::Equal,
            '!' => TokenKind::Bang,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            _ => TokenKind::Slash,
        };

        let Some(c) = next_char else {
            return emit(LexerState::Normal, single_kind, single(first), first.line);
        };

        let double_kind = match (first.value, c.value) {
            ('=', '=') => Some(TokenKind::EqualEqual),
            ('!', '=') => Some(TokenKind::BangEqual),
            ('<', '=') => Some(TokenKind::LessThanEqual),
            ('>', '=') => Some(TokenKind::GreaterThanEqual),
            ('/', '/') => return LexerStateTransition::ChangeState(LexerState::Comment),
            _ => None,
        };

        match double_kind {
            Some(kind) => emit(
                LexerState::Normal,
                kind,
                Span::new(first.offset, c.next_offset()),
                first.line,
            ),
            None => LexerStateTransition::ChangeStateAndEmitAndPutBack {
                new_state: LexerState::Normal,
                token_or_error: Ok(Token {
                    kind: single_kind,
                    span: single(first),
                    line: first.line,
                }),
                put_back: c,
            },
        }
    }

    fn execute_comment(next_char: Option<SourceChar>) -> LexerStateTransition {
        match next_char {
            Some(SourceChar { value: '\n', .. }) | None => {
                LexerStateTransition::ChangeState(LexerState::Normal)
            }
            Some(_) => LexerStateTransition::Stay,
        }
    }

    fn lex_ident_or_keyword(source: &str, start: &SourceChar, end: SpanIndex) -> Token {
        let span = Span::new(start.offset, end);
        let lexeme = &source[span.range()];
        Token {
            kind: KEYWORD_HASHMAP
                .get(lexeme)
                .copied()
                .unwrap_or(TokenKind::Ident),
            span,
            line: start.line,
        }
    }

    fn execute_ident(
        source: &str,
        start: &SourceChar,
        next_char: Option<SourceChar>,
        end: SourceEnd,
    ) -> LexerStateTransition {
        let Some(c) = next_char else {
            return LexerStateTransition::ChangeStateAndEmit {
                new_state: LexerState::Normal,
                token_or_error: Ok(Self::lex_ident_or_keyword(source, start, end.offset)),
            };
        };

        if c.value.is_ascii_alphanumeric() || c.value == '_' {
            LexerStateTransition::Stay
        } else {
            LexerStateTransition::ChangeStateAndEmitAndPutBack {
                new_state: LexerState::Normal,
                token_or_error: Ok(Self::lex_ident_or_keyword(source, start, c.offset)),
                put_back: c,
            }
        }
    }

    fn execute_number(
        state: &NumberState,
        next_char: Option<SourceChar>,
        end: SourceEnd,
    ) -> LexerStateTransition {
        let number = |end: SpanIndex| Token {
            kind: TokenKind::NumericLiteral,
            span: Span::new(state.start.offset, end),
            line: state.start.line,
        };

        // A dot without digits after it is not part of the number.
        let dangling_dot = match state.dot {
            Some(dot) if !state.has_fraction => Some(dot),
            _ => None,
        };

        let Some(c) = next_char else {
            return match dangling_dot {
                Some(dot) => LexerStateTransition::ChangeStateAndEmitAndPutBack {
                    new_state: LexerState::Normal,
                    token_or_error: Ok(number(dot.offset)),
                    put_back: dot,
                },
                None => LexerStateTransition::ChangeStateAndEmit {
                    new_state: LexerState::Normal,
                    token_or_error: Ok(number(end.offset)),
                },
            };
        };

        match c.value {
            '0'..='9' if dangling_dot.is_some() => {
                LexerStateTransition::ChangeState(LexerState::Number(NumberState {
                    has_fraction: true,
                    ..*state
                }))
            }
            '0'..='9' => LexerStateTransition::Stay,
            '.' if state.dot.is_none() => {
                LexerStateTransition::ChangeState(LexerState::Number(NumberState {
                    dot: Some(c),
                    ..*state
                }))
            }
            _ => match dangling_dot {
                Some(dot) => LexerStateTransition::ChangeStateAndEmitAndPutBackTwo {
                    new_state: LexerState::Normal,
                    token_or_error: Ok(number(dot.offset)),
                    put_back: (dot, c),
                },
                None => LexerStateTransition::ChangeStateAndEmitAndPutBack {
                    new_state: LexerState::Normal,
                    token_or_error: Ok(number(c.offset)),
                    put_back: c,
                },
            },
        }
    }

    fn execute_string(
        start: &SourceChar,
        next_char: Option<SourceChar>,
        end: SourceEnd,
    ) -> LexerStateTransition {
        match next_char {
            None => LexerStateTransition::ChangeStateAndEmit {
                new_state: LexerState::Normal,
                token_or_error: Err(LexicalError {
                    kind: LexicalErrorKind::UnclosedString,
                    span: Span::new(start.offset, end.offset),
                    line: end.line,
                }),
            },
            Some(c) if c.value == '"' => emit(
                LexerState::Normal,
                TokenKind::StringLiteral,
                Span::new(start.offset, c.next_offset()),
                start.line,
            ),
            Some(_) => LexerStateTransition::Stay,
        }
    }
}
