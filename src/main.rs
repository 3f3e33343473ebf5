//! Lox CLI
//!
//! Command-line interface for the Lox expression front end.

use std::env;
use std::fs;
use std::process;

use lox_lang::error::{EXIT_LEXER, EXIT_USAGE};
use lox_lang::{
    tokenize, AstPrinter, Config, Diagnostic, Logger, LoxError, Parser, ScanOutput, Unparser,
    VERSION,
};

/// What to print after a successful parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Tree,
    Source,
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    process::exit(run(&args));
}

fn run(args: &[String]) -> i32 {
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return report(&e, None),
    };

    let mut positional: Vec<&str> = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return 0;
            }
            "--version" | "-V" => {
                println!("lox {}", VERSION);
                return 0;
            }
            "--no-color" => config.color = false,
            "-v" => config.increase_verbosity(),
            "--log" => {
                let Some(level) = iter.next() else {
                    return usage("--log needs a level");
                };
                if let Err(e) = config.set_log_level(level) {
                    return report(&e, None);
                }
            }
            _ if arg.starts_with('-') => return usage(&format!("Unknown flag: {}", arg)),
            _ => positional.push(arg),
        }
    }

    if !config.color {
        colored::control::set_override(false);
    }
    let logger = config.logger();

    match positional.as_slice() {
        ["tokenize", file] => tokenize_file(file, &*logger),
        ["parse", file] => parse_file(file, Output::Tree, &*logger),
        ["unparse", file] => parse_file(file, Output::Source, &*logger),
        [] => usage("No command given"),
        [command, ..] if !matches!(*command, "tokenize" | "parse" | "unparse") => {
            usage(&format!("Unknown command: {}", command))
        }
        _ => usage("Expected exactly one input file"),
    }
}

fn usage(message: &str) -> i32 {
    eprintln!("Error: {}", message);
    eprintln!("Usage: lox [OPTIONS] <tokenize|parse|unparse> <file>");
    eprintln!("       lox --help");
    EXIT_USAGE
}

fn print_help() {
    println!("lox v{} - Lox expression front end", VERSION);
    println!();
    println!("USAGE:");
    println!("    lox [OPTIONS] <COMMAND> <file>");
    println!();
    println!("COMMANDS:");
    println!("    tokenize    Print one line per token");
    println!("    parse       Print the fully parenthesized tree");
    println!("    unparse     Print the tree back as source");
    println!();
    println!("OPTIONS:");
    println!("    --log <level>   Log level (error, warn, info, debug, trace)");
    println!("    -v              Raise log verbosity one step");
    println!("    --no-color      Disable coloured output");
    println!("    -h, --help      Show this help message");
    println!("    -V, --version   Show the version");
    println!();
    println!("ENVIRONMENT:");
    println!("    LOX_LOG     Default log level");
    println!("    NO_COLOR    Disable coloured output when set");
}

/// Print an error to stderr and return its exit code
fn report(error: &LoxError, source: Option<&str>) -> i32 {
    let diagnostic = match source {
        Some(source) => Diagnostic::with_source(error, source),
        None => Diagnostic::new(error),
    };
    eprint!("{}", diagnostic);
    error.exit_code()
}

fn read_source(path: &str) -> Result<String, LoxError> {
    fs::read_to_string(path)
        .map_err(|e| LoxError::io_error(format!("Failed to read file '{}': {}", path, e)))
}

/// Print every diagnostic; returns whether there were any
fn report_scan_errors(output: &ScanOutput, source: &str, path: &str) -> bool {
    for error in &output.diagnostics {
        report(error, Some(source));
    }
    if output.had_error() {
        eprintln!("Error: lexer had errors [{}]", path);
    }
    output.had_error()
}

fn tokenize_file(path: &str, logger: &dyn Logger) -> i32 {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(e) => return report(&e, None),
    };

    let output = tokenize(&source, Some(path), logger);
    for token in &output.tokens {
        println!("{}", token);
    }

    if report_scan_errors(&output, &source, path) {
        EXIT_LEXER
    } else {
        0
    }
}

fn parse_file(path: &str, mode: Output, logger: &dyn Logger) -> i32 {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(e) => return report(&e, None),
    };

    let output = tokenize(&source, Some(path), logger);
    if report_scan_errors(&output, &source, path) {
        return EXIT_LEXER;
    }

    match Parser::new(output.tokens, logger).parse() {
        Ok(ast) => {
            match mode {
                Output::Tree => println!("{}", AstPrinter::print(&ast)),
                Output::Source => println!("{}", Unparser::unparse(&ast)),
            }
            0
        }
        Err(e) => report(&e, Some(&source)),
    }
}
