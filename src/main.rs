use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::{fs::read_to_string, process::ExitCode};
use taulox::interpreter::{ExecutionMode, StdioContext, TreeWalkInterpreter};
use taulox::lexer::formatter::{
    BasicFormatter as BasicTokenFormatter, DebugFormatter as DebugTokenFormatter,
    PrettyFormatter as PrettyTokenFormatter, TokenFormatter,
};
use taulox::lexer::{Lexer, TokenKind};
use taulox::parser::formatter::{
    BasicParserFormatter, DebugFormatter as DebugParserFormatter, ParserFormatter,
    PrettyParserFormatter, ProgramFormatter, SExpressionFormatter,
};
use taulox::parser::statement::Program;
use taulox::parser::Parser;
use taulox::value::formatter::{
    BasicFormatter as BasicValueFormatter, DebugFormatter as DebugValueFormatter,
    PrettyFormatter as PrettyValueFormatter, ValueFormatter,
};

const EXIT_STATIC_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;

static TRACING_INIT: Once = Once::new();

#[derive(Debug, ClapParser)]
#[clap(name = "taulox", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: TauloxCommand,
}

#[derive(Debug, Subcommand)]
pub enum TauloxCommand {
    /// Print every token in the file.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: OutputFormat,
    },
    /// Print the syntax tree of every top level statement.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: OutputFormat,
    },
    /// Execute the file, echoing the value of each expression statement.
    Evaluate {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: OutputFormat,
    },
    /// Execute the file. Only `print` produces output.
    Run {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: OutputFormat,
    },
    /// Read and execute lines from standard input.
    Repl {
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Basic,
    Pretty,
    Debug,
}

/// Installs a stderr subscriber when `RUST_LOG` is set. Later calls do nothing.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_tracing();
    let args = CLArgs::parse();
    tracing::debug!(?args, "starting");
    match args.routine {
        TauloxCommand::Tokenize { path, format } => {
            let src = read_to_string(&path)?;
            Ok(tokenize(&src, &path, format))
        }
        TauloxCommand::Parse { path, format } => {
            let src = read_to_string(&path)?;
            Ok(parse(&src, &path, format))
        }
        TauloxCommand::Evaluate { path, format } => {
            let src = read_to_string(&path)?;
            Ok(execute(&src, &path, format, ExecutionMode::Evaluate))
        }
        TauloxCommand::Run { path, format } => {
            let src = read_to_string(&path)?;
            Ok(execute(&src, &path, format, ExecutionMode::Script))
        }
        TauloxCommand::Repl { format } => repl(format),
    }
}

fn token_formatter<'src>(
    src: &'src str,
    path: &'src Path,
    format: OutputFormat,
) -> Box<dyn TokenFormatter + 'src> {
    match format {
        OutputFormat::Basic => Box::new(BasicTokenFormatter::new(src)),
        OutputFormat::Pretty => Box::new(PrettyTokenFormatter::new(src, path)),
        OutputFormat::Debug => Box::new(DebugTokenFormatter),
    }
}

fn parser_formatter<'src>(
    src: &'src str,
    path: &'src Path,
    format: OutputFormat,
) -> Box<dyn ParserFormatter + 'src> {
    match format {
        OutputFormat::Basic => Box::new(BasicParserFormatter::new(src)),
        OutputFormat::Pretty => Box::new(PrettyParserFormatter::new(src, path)),
        OutputFormat::Debug => Box::new(DebugParserFormatter),
    }
}

fn value_formatter<'src>(
    src: &'src str,
    path: &'src Path,
    format: OutputFormat,
) -> Box<dyn ValueFormatter + 'src> {
    match format {
        OutputFormat::Basic => Box::new(BasicValueFormatter::new(src)),
        OutputFormat::Pretty => Box::new(PrettyValueFormatter::new(src, path)),
        OutputFormat::Debug => Box::new(DebugValueFormatter),
    }
}

fn tokenize(src: &str, path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = token_formatter(src, path, format);
    let mut lexer = Lexer::new(src);
    let mut succeeded = true;
    loop {
        match lexer.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    break;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_error(&error));
                succeeded = false;
            }
        }
    }
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_STATIC_ERROR)
    }
}

/// Lexes and parses `src`, reporting any failure to stderr.
fn build_program(src: &str, path: &Path, format: OutputFormat) -> Option<Program> {
    let mut parser = match Parser::from_source(src) {
        Ok(parser) => parser,
        Err(errors) => {
            let formatter = token_formatter(src, path, format);
            for error in errors.iter() {
                eprintln!("{}", formatter.format_error(error));
            }
            return None;
        }
    };
    match parser.parse() {
        Ok(program) => Some(program),
        Err(error) => {
            eprintln!("{}", parser_formatter(src, path, format).format_error(&error));
            None
        }
    }
}

fn parse(src: &str, path: &Path, format: OutputFormat) -> ExitCode {
    let Some(program) = build_program(src, path, format) else {
        return ExitCode::from(EXIT_STATIC_ERROR);
    };
    let formatter: Box<dyn ProgramFormatter> = match format {
        OutputFormat::Basic | OutputFormat::Pretty => Box::new(SExpressionFormatter),
        OutputFormat::Debug => Box::new(DebugParserFormatter),
    };
    for statement in program.iter() {
        println!("{}", formatter.format_statement(statement));
    }
    ExitCode::SUCCESS
}

fn execute(src: &str, path: &Path, format: OutputFormat, mode: ExecutionMode) -> ExitCode {
    let Some(program) = build_program(src, path, format) else {
        return ExitCode::from(EXIT_STATIC_ERROR);
    };
    let mut interpreter = TreeWalkInterpreter::new(mode);
    match interpreter.run(&program, &mut StdioContext) {
        Ok(value) => {
            tracing::debug!(%value, "program finished");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", value_formatter(src, path, format).format_error(&error));
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn repl(format: OutputFormat) -> Result<ExitCode> {
    let path = Path::new("<repl>");
    let mut interpreter = TreeWalkInterpreter::new(ExecutionMode::Evaluate);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if let Some(program) = build_program(&line, path, format) {
            if let Err(error) = interpreter.run(&program, &mut StdioContext) {
                eprintln!("{}", value_formatter(&line, path, format).format_error(&error));
            }
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(ExitCode::SUCCESS)
}
