use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use color_eyre::{eyre::Context, Result};
use taulox::{
    interpreter::{BufferedContext, ExecutionMode, TreeWalkInterpreter},
    lexer::formatter::{BasicFormatter as BasicTokenFormatter, TokenFormatter},
    parser::{
        formatter::{BasicParserFormatter, ParserFormatter},
        Parser, MAX_NESTING_DEPTH,
    },
    value::{
        formatter::{BasicFormatter as BasicValueFormatter, ValueFormatter},
        LoxValue,
    },
};

#[test]
fn test_assignment() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/assignment");
    test_engine(input_dir)
}

#[test]
fn test_block() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/block");
    test_engine(input_dir)
}

#[test]
fn test_bool() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/bool");
    test_engine(input_dir)
}

#[test]
fn test_comments() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/comments");
    test_engine(input_dir)
}

#[test]
fn test_if() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/if");
    test_engine(input_dir)
}

#[test]
fn test_nil() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/nil");
    test_engine(input_dir)
}

#[test]
fn test_number() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/number");
    test_engine(input_dir)
}

#[test]
fn test_operator() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/operator");
    test_engine(input_dir)
}

#[test]
fn test_precedence() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/precedence");
    test_engine(input_dir)
}

#[test]
fn test_print() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/print");
    test_engine(input_dir)
}

#[test]
fn test_string() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/string");
    test_engine(input_dir)
}

#[test]
fn test_variable() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/variable");
    test_engine(input_dir)
}

#[test]
fn evaluate_mode_echoes_every_expression_statement() {
    let source = "var a = 1;\na + 1;\nprint \"p\";\n{ a = 5; }\na * 2";
    let program = Parser::from_source(source)
        .expect("Lexically valid.")
        .parse()
        .expect("Parses.");
    let mut interpreter = TreeWalkInterpreter::new(ExecutionMode::Evaluate);
    let mut context = BufferedContext::new();
    let result = interpreter.run(&program, &mut context);
    assert_eq!(context.into_data(), "2\np\n5\n10\n");
    assert_eq!(result, Ok(LoxValue::Number(10.0)));
}

#[test]
fn interpreter_state_persists_between_programs() {
    let mut interpreter = TreeWalkInterpreter::new(ExecutionMode::Evaluate);
    let mut context = BufferedContext::new();
    for line in ["var count = 1;", "{ count = count + 1; missing; }", "count"] {
        let program = Parser::from_source(line)
            .expect("Lexically valid.")
            .parse()
            .expect("Parses.");
        let _ = interpreter.run(&program, &mut context);
    }
    assert_eq!(context.into_data(), "2\n2\n");
    assert_eq!(interpreter.get_environment().depth(), 1);
}

#[test]
fn nesting_below_the_limit_evaluates() {
    let depth = MAX_NESTING_DEPTH - 8;
    let source = format!(
        "{}var x = {}-1{};{}",
        "{".repeat(depth / 2),
        "(".repeat(depth / 2),
        ")".repeat(depth / 2),
        "}".repeat(depth / 2)
    );
    let program = Parser::from_source(&source)
        .expect("Lexically valid.")
        .parse()
        .expect("Parses.");
    let mut interpreter = TreeWalkInterpreter::new(ExecutionMode::Script);
    let mut context = BufferedContext::new();
    assert_eq!(interpreter.run(&program, &mut context), Ok(LoxValue::Nil));
    assert_eq!(interpreter.get_environment().depth(), 1);
}

fn test_engine(input_dir: &Path) -> Result<()> {
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

        println!("Parsing {path:?}");
        let test_case = parse_test_case(&path)?;
        println!("Checking {}", test_case.name);

        let res = std::panic::catch_unwind(|| {
            test_case.check();
        });
        if res.is_err() {
            println!("\tFails test case {}", test_case.name);
            succeeded = false;
        }
    }

    assert!(succeeded, "Some interpreter test cases failed.");

    Ok(())
}

fn parse_test_case(input_path: &Path) -> Result<TestCase> {
    let test_name = AsRef::<Path>::as_ref(
        input_path
            .file_name()
            .expect("File name can't be none as the path is to a real file."),
    )
    .to_string_lossy();

    let input = read_to_string(input_path).context("Failed to open input test data file")?;

    let mut source_lines = Vec::new();
    let mut expected_outputs = Vec::new();
    let mut expected_static_errors = Vec::new();
    let mut expected_runtime_errors = Vec::new();

    for (line_index, line) in input.lines().enumerate() {
        let line_number = line_index + 1;
        if let Some(expected) = annotation(line, "// expect:") {
            expected_outputs.push(expected.to_string());
        } else if let Some(expected) = annotation(line, "// expect runtime error:") {
            expected_runtime_errors.push(format!("{expected}\n[line {line_number}]"));
        } else if let Some(expected) = annotation(line, "// [line ") {
            expected_static_errors.push(format!("[line {expected}"));
        } else if let Some(expected) = annotation(line, "// Error at") {
            expected_static_errors.push(format!("[line {line_number}] Error at {expected}"));
        }
        source_lines.push(line.to_string());
    }

    expected_outputs.push(String::new());
    Ok(TestCase {
        name: test_name.into_owned(),
        source: source_lines.join("\n"),
        output: expected_outputs.join("\n"),
        static_errors: expected_static_errors.join("\n"),
        runtime_errors: expected_runtime_errors.join("\n"),
    })
}

/// The text following `marker` on `line`, if the marker is present.
fn annotation<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let index = line.find(marker)?;
    Some(line[index + marker.len()..].trim())
}

struct TestCase {
    name: String,
    source: String,
    output: String,
    static_errors: String,
    runtime_errors: String,
}

impl TestCase {
    fn check(&self) {
        let (output, static_errors, runtime_errors) = run_source(&self.source);
        assert_eq!(output, self.output, "Output of {}", self.name);
        assert_eq!(
            static_errors, self.static_errors,
            "Static errors of {}",
            self.name
        );
        assert_eq!(
            runtime_errors, self.runtime_errors,
            "Runtime errors of {}",
            self.name
        );
    }
}

/// Runs `source` as a script, returning its output followed by any lexical or syntax
/// errors and any runtime error, each in their basic form.
fn run_source(source: &str) -> (String, String, String) {
    let mut parser = match Parser::from_source(source) {
        Ok(parser) => parser,
        Err(errors) => {
            let formatter = BasicTokenFormatter::new(source);
            let errors: Vec<String> = errors.iter().map(|e| formatter.format_error(e)).collect();
            return (String::new(), errors.join("\n"), String::new());
        }
    };
    let program = match parser.parse() {
        Ok(program) => program,
        Err(error) => {
            let formatter = BasicParserFormatter::new(source);
            return (String::new(), formatter.format_error(&error), String::new());
        }
    };

    let mut interpreter = TreeWalkInterpreter::new(ExecutionMode::Script);
    let mut context = BufferedContext::new();
    let runtime_error = match interpreter.run(&program, &mut context) {
        Ok(_) => String::new(),
        Err(error) => BasicValueFormatter::new(source).format_error(&error),
    };
    (context.into_data(), String::new(), runtime_error)
}
