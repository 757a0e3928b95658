use color_eyre::eyre::{Context, Result};
use proptest::prelude::*;
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use taulox::interpreter::{ExecutionMode, TreeWalkInterpreter};
use taulox::parser::{
    expression::Expression,
    formatter::{
        BasicParserFormatter, ExpressionFormatter, ParserFormatter, ProgramFormatter,
        SExpressionFormatter, SourceFormatter,
    },
    Parser,
};
use taulox::value::{error::RuntimeErrorKind, LoxValue};

fn check(input: &str, expected: &str, test_name: &str) {
    let mut parser = Parser::from_source(input).expect("Parser test data is lexically valid.");
    let actual = match parser.parse() {
        Ok(ref program) => SExpressionFormatter.format_program(program),
        Err(ref e) => BasicParserFormatter::new(input).format_error(e),
    };

    assert_eq!(actual, expected.trim_end(), "Failed the test {test_name}");
}

#[test]
fn smoke_test() {
    check("", "", "smoke");
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/parser/in");
    let output_dir = Path::new("./test_data/parser/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "lox" {
            continue;
        }

        let test_name = AsRef::<Path>::as_ref(
            path.file_name()
                .expect("File name can't be none as the path is to a real file."),
        );

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_file_name = test_name.with_extension("txt");
            let output_path = output_dir.join(output_file_name);
            read_to_string(&output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded, "Some parser test cases failed.");

    Ok(())
}

#[test]
fn printed_program_reparses_to_same_tree() -> Result<()> {
    let input = read_to_string("./test_data/parser/in/statements.lox")
        .context("Failed to open input test data file")?;
    let program = Parser::from_source(&input)
        .expect("Lexically valid.")
        .parse()?;
    let printed = SourceFormatter.format_program(&program);
    let reparsed = Parser::from_source(&printed)
        .expect("Printed source is lexically valid.")
        .parse()?;
    assert_eq!(
        SExpressionFormatter.format_program(&program),
        SExpressionFormatter.format_program(&reparsed)
    );
    Ok(())
}

// Property-based tests

fn parse_expression(source: &str) -> Expression {
    Parser::from_source(source)
        .expect("Generated source is lexically valid.")
        .parse_expression()
        .expect("Generated source is a valid expression.")
}

fn evaluate(expr: &Expression) -> Result<LoxValue, RuntimeErrorKind> {
    TreeWalkInterpreter::new(ExecutionMode::Script)
        .evaluate(expr)
        .map_err(|error| error.kind)
}

fn atom_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000).prop_map(|v| v.to_string()),
        (0u32..1000, 0u32..100).prop_map(|(whole, fraction)| format!("{whole}.{fraction}")),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("nil".to_string()),
        "[a-z ]{0,8}".prop_map(|s: String| format!("\"{s}\"")),
    ]
}

fn infix_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("/"),
        Just("<"),
        Just("<="),
        Just(">"),
        Just(">="),
        Just("=="),
        Just("!="),
    ]
}

/// Source text of arbitrary expressions. Operands are joined without extra parentheses so
/// the shape of the tree is left entirely to precedence and associativity.
fn expression_strategy() -> impl Strategy<Value = String> {
    atom_strategy().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| format!("({e})")),
            (prop_oneof![Just("-"), Just("!")], inner.clone())
                .prop_map(|(op, e)| format!("{op}{e}")),
            (inner.clone(), infix_strategy(), inner)
                .prop_map(|(lhs, op, rhs)| format!("{lhs} {op} {rhs}")),
        ]
    })
}

proptest! {
    #[test]
    fn printed_expression_reparses_to_same_tree(source in expression_strategy()) {
        let first = parse_expression(&source);
        let printed = SourceFormatter.format(&first);
        let second = parse_expression(&printed);

        prop_assert_eq!(
            SExpressionFormatter.format(&first),
            SExpressionFormatter.format(&second)
        );
        prop_assert_eq!(SourceFormatter.format(&second), printed);
        prop_assert_eq!(evaluate(&first), evaluate(&second));
    }
}
