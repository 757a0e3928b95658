use super::{LexicalError, LexicalErrorKind, Token};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_error(&self, error: &LexicalError) -> String;
}

/// Formats tokens as `KIND lexeme literal` lines.
pub struct BasicFormatter<'src> {
    text: &'src str,
}

impl<'src> BasicFormatter<'src> {
    pub fn new(text: &'src str) -> Self {
        Self { text }
    }

    pub fn get_text(&self) -> &'src str {
        self.text
    }
}

impl<'src> TokenFormatter for BasicFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        let literal = token
            .literal(self.text)
            .unwrap_or_else(|| String::from("null"));
        format!("{} {} {literal}", token.kind, token.lexeme(self.text))
    }

    fn format_error(&self, error: &LexicalError) -> String {
        format!("{error}")
    }
}

pub struct DebugFormatter;

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}

/// Prefixes tokens with their line and renders errors as annotated source snippets.
pub struct PrettyFormatter<'src> {
    basic: BasicFormatter<'src>,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self {
            basic: BasicFormatter::new(text),
            path,
        }
    }
}

impl<'src> TokenFormatter for PrettyFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        format!("({}) {}", token.line, self.basic.format(token))
    }

    fn format_error(&self, error: &LexicalError) -> String {
        let path = self.path.to_string_lossy();
        let path = path.as_ref();
        let span = error.span.range();
        let label = match error.kind {
            LexicalErrorKind::Unrecognized(c) => Label::new((path, span.clone()))
                .with_message(format!(
                    "{} is not a valid character here",
                    c.fg(Color::BrightYellow)
                ))
                .with_color(Color::BrightRed),
            LexicalErrorKind::UnclosedString => Label::new((path, span.clone()))
                .with_message("This string is never closed")
                .with_color(Color::BrightRed),
        };

        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span))
            .with_code(error.code())
            .with_message(error.kind.to_string())
            .with_label(label)
            .finish()
            .write((path, Source::from(self.basic.get_text())), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
