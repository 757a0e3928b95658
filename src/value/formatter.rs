use super::error::{RuntimeError, RuntimeErrorKind};
use super::LoxValue;
use crate::lexer::LineBreaks;
use ariadne::{Color, ColorGenerator, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ValueFormatter {
    fn format(&self, value: &LoxValue) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, value: &LoxValue) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// Canonical value text, and runtime errors as the message followed by `[line N]`.
pub struct BasicFormatter {
    line_breaks: LineBreaks,
}

impl BasicFormatter {
    pub fn new(text: &str) -> Self {
        let line_breaks = LineBreaks::new(text);
        Self { line_breaks }
    }

    fn format_verbose(value: &LoxValue) -> String {
        match value {
            LoxValue::Number(v) => format!("Number({})", super::format_number(*v)),
            LoxValue::String(v) => format!("String(\"{v}\")"),
            LoxValue::Nil => "Nil".into(),
            LoxValue::Bool(v) => format!("Bool({v})"),
            LoxValue::DivisionByZero => "DivisionByZero".into(),
        }
    }
}

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &LoxValue) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("{}\n[line {line}]", error.kind)
    }
}

pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ValueFormatter for PrettyFormatter<'src> {
    fn format(&self, value: &LoxValue) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let path = self.path.to_string_lossy();
        let path = path.as_ref();
        let span = error.span.range();
        let label = match &error.kind {
            RuntimeErrorKind::NonNumeric(v) => format!(
                "Type is {} instead of numeric",
                BasicFormatter::format_verbose(v).fg(Color::BrightRed)
            ),
            RuntimeErrorKind::NonNumerics(lhs, rhs) => format!(
                "One or both of {} and {} is not numeric",
                BasicFormatter::format_verbose(lhs).fg(Color::BrightRed),
                BasicFormatter::format_verbose(rhs).fg(Color::BrightRed),
            ),
            RuntimeErrorKind::NonAddable(lhs, rhs) => {
                let mut colors = ColorGenerator::new();
                format!(
                    "{} and {} are not both numbers or both strings",
                    BasicFormatter::format_verbose(lhs).fg(colors.next()),
                    BasicFormatter::format_verbose(rhs).fg(colors.next()),
                )
            }
            RuntimeErrorKind::UndefinedVariable(name) => format!(
                "{} has not been declared in any enclosing scope",
                name.fg(Color::BrightRed)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Span, SpanIndex};

    #[test]
    fn basic_error_reports_line_of_span() {
        let text = "var a = 1;\nprint -\"a\";\n";
        let start = SpanIndex::from(text.find('-').expect("Source has a minus."));
        let error = RuntimeError {
            kind: RuntimeErrorKind::NonNumeric(LoxValue::String("a".into())),
            span: Span::new(start, start + 1usize),
        };
        assert_eq!(
            BasicFormatter::new(text).format_error(&error),
            "Operand must be a number.\n[line 2]"
        );
    }

    #[test]
    fn basic_value_is_canonical_text() {
        let formatter = BasicFormatter::new("");
        assert_eq!(formatter.format(&LoxValue::Number(3.0)), "3");
        assert_eq!(formatter.format(&LoxValue::String("hi".into())), "hi");
        assert_eq!(formatter.format(&LoxValue::DivisionByZero), "ERROR");
    }
}
