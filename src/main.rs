use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::path::PathBuf;

use lox_interpreter as lox;

use clap::Parser as ClapParser;
use clap::Subcommand;

use lox::ast::Stmt;
use lox::ast_printer::AstPrinter;
use lox::error::LoxError;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes the provided input from a given valid filepath
    Tokenize { filename: PathBuf },

    /// Parses a single expression and prints its syntax tree
    Parse { filename: PathBuf },

    /// Runs a Lox script
    Run { filename: PathBuf },
}

/// Conventional sysexits codes: 65 for malformed input, 70 for an internal
/// software (runtime) error.
const EXIT_COMPILE_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;

/// Outcome of one trip through the pipeline.
enum Outcome {
    Ok,
    CompileError,
    RuntimeError,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::parse();

    match args.commands {
        Some(Commands::Tokenize { filename }) => tokenize(&filename),

        Some(Commands::Parse { filename }) => parse(&filename),

        Some(Commands::Run { filename }) => run_file(&filename),

        None => run_prompt(),
    }
}

fn read_source(filename: &PathBuf) -> anyhow::Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    let mut reader: BufReader<File> = BufReader::new(File::open(filename)?);

    reader.read_to_end(&mut buf)?;

    Ok(buf)
}

/// Drain the scanner, splitting tokens from lexical errors so both sides of
/// a partially broken source surface.
fn scan(source: &[u8]) -> (Vec<Token>, Vec<LoxError>) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    (tokens, errors)
}

fn report(errors: &[LoxError]) {
    for e in errors {
        eprintln!("{}", e);
    }
}

fn tokenize(filename: &PathBuf) -> anyhow::Result<()> {
    let buf: Vec<u8> = read_source(filename)?;

    let mut tokenized = true;

    for token in Scanner::new(&buf) {
        match token {
            Ok(token) => println!("{}", token),

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        std::process::exit(EXIT_COMPILE_ERROR);
    }

    Ok(())
}

fn parse(filename: &PathBuf) -> anyhow::Result<()> {
    let buf: Vec<u8> = read_source(filename)?;

    let (tokens, lex_errors) = scan(&buf);

    if !lex_errors.is_empty() {
        report(&lex_errors);
        std::process::exit(EXIT_COMPILE_ERROR);
    }

    let mut parser: Parser = Parser::new(tokens);

    match parser.parse_expression() {
        Ok(expr) => println!("{}", AstPrinter::print(&expr)),

        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_COMPILE_ERROR);
        }
    }

    Ok(())
}

fn run_file(filename: &PathBuf) -> anyhow::Result<()> {
    let buf: Vec<u8> = read_source(filename)?;

    let mut stdout: io::Stdout = io::stdout();
    let mut interpreter: Interpreter<'_, io::Stdout> = Interpreter::new(&mut stdout);

    match run(&mut interpreter, &buf, false) {
        Outcome::Ok => Ok(()),

        Outcome::CompileError => std::process::exit(EXIT_COMPILE_ERROR),

        Outcome::RuntimeError => std::process::exit(EXIT_RUNTIME_ERROR),
    }
}

fn run_prompt() -> anyhow::Result<()> {
    let mut stdout: io::Stdout = io::stdout();
    let mut interpreter: Interpreter<'_, io::Stdout> = Interpreter::new(&mut stdout);

    let stdin: io::Stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line: String = String::new();

        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let line: &str = line.trim_end_matches(['\n', '\r']);

        if line.is_empty() {
            break;
        }

        // Errors are reported and control returns to the prompt.
        run(&mut interpreter, line.as_bytes(), true);
    }

    Ok(())
}

/// One trip through the pipeline: scan, parse, resolve, evaluate. With
/// `echo` set (the REPL), top-level expression statements print their value.
fn run<W: Write>(interpreter: &mut Interpreter<'_, W>, source: &[u8], echo: bool) -> Outcome {
    let (tokens, lex_errors) = scan(source);

    report(&lex_errors);

    let mut parser: Parser = Parser::new(tokens);

    let statements: Vec<Stmt> = match parser.parse() {
        Ok(statements) => statements,

        Err(errors) => {
            report(&errors);
            return Outcome::CompileError;
        }
    };

    if !lex_errors.is_empty() {
        return Outcome::CompileError;
    }

    let mut resolver = Resolver::new(interpreter);

    if let Err(errors) = resolver.resolve(&statements) {
        report(&errors);
        return Outcome::CompileError;
    }

    if echo {
        for statement in &statements {
            let result = match statement {
                Stmt::Expression(expr) => interpreter.echo_expression(expr),

                _ => interpreter.interpret(std::slice::from_ref(statement)),
            };

            if let Err(e) = result {
                eprintln!("{}", e);
                return Outcome::RuntimeError;
            }
        }
    } else if let Err(e) = interpreter.interpret(&statements) {
        eprintln!("{}", e);
        return Outcome::RuntimeError;
    }

    Outcome::Ok
}
