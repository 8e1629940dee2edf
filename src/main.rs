use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use clap::Parser as ClapParser;
use log::info;

use glox::error::ErrorReporter;
use glox::expr::ExprId;
use glox::interpreter::Interpreter;
use glox::parser::Parser;
use glox::resolver::Resolver;
use glox::scanner::Scanner;
use glox::stmt::Stmt;
use glox::token::Token;
use glox::value::Value;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Script to execute; starts the REPL when omitted.
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::parse();

    match args.script {
        Some(path) => run_file(&path),

        None => run_prompt(),
    }
}

fn run_file(path: &PathBuf) -> anyhow::Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    let mut reader: BufReader<File> = BufReader::new(File::open(path)?);

    reader.read_to_end(&mut buf)?;

    let mut interpreter: Interpreter = Interpreter::new();
    let mut reporter: ErrorReporter = ErrorReporter::new();

    run(buf, &mut interpreter, &mut reporter, 0);

    if reporter.had_static_error() {
        std::process::exit(65);
    }

    if reporter.had_runtime_error() {
        std::process::exit(70);
    }

    Ok(())
}

fn run_prompt() -> anyhow::Result<()> {
    let stdin = io::stdin();

    // One interpreter for the whole session, so definitions persist and
    // node ids keep counting up across inputs.
    let mut interpreter: Interpreter = Interpreter::new();
    let mut reporter: ErrorReporter = ErrorReporter::new();
    let mut next_id: ExprId = 0;

    println!("Welcome to the glox repl. Press CTRL-D to exit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line: String = String::new();

        if stdin.read_line(&mut line)? == 0 {
            info!("REPL reached end of input");

            break;
        }

        let (id, value) = run(line.into_bytes(), &mut interpreter, &mut reporter, next_id);

        next_id = id;

        // Echo the value of a trailing expression statement.
        if let Some(value) = value {
            println!("{}", value.repr());
        }

        // The session survives errors.
        reporter.reset();
    }

    Ok(())
}

/// Scan, parse, resolve, interpret. Returns the next free node id and, for
/// the REPL, the value of a trailing expression statement.
fn run(
    source: Vec<u8>,
    interpreter: &mut Interpreter,
    reporter: &mut ErrorReporter,
    first_id: ExprId,
) -> (ExprId, Option<Value>) {
    let scanner: Scanner = Scanner::new(source);

    let mut tokens: Vec<Token> = Vec::new();

    for item in scanner {
        match item {
            Ok(token) => tokens.push(token),

            Err(e) => reporter.report(&e),
        }
    }

    if reporter.had_scan_error() {
        return (first_id, None);
    }

    let mut parser: Parser = Parser::starting_at(tokens, first_id);
    let statements: Vec<Stmt> = parser.parse();
    let next_id: ExprId = parser.next_id();

    for e in parser.errors() {
        reporter.report(e);
    }

    if reporter.had_parse_error() {
        return (next_id, None);
    }

    let mut resolver: Resolver = Resolver::new(interpreter);

    if let Err(e) = resolver.resolve(&statements) {
        reporter.report(&e);

        return (next_id, None);
    }

    match interpreter.interpret(&statements) {
        Ok(value) => (next_id, value),

        Err(e) => {
            reporter.report(&e);

            (next_id, None)
        }
    }
}
