use crate::error::CalcError;
use crate::evaluator::{Environment, Evaluator};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::Value;
use std::io::{self, Write};

/// Interactive shell. The environment is the only state crossing line
/// boundaries; everything else is scoped to a single input line.
pub fn start(quiet: bool) {
    if !quiet {
        println!("rafmath v{}", env!("CARGO_PKG_VERSION"));
        println!("Type 'exit' to quit");
        println!();
    }

    let mut environment = Environment::new();

    loop {
        print!("rafmath: ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" {
                    println!("Goodbye");
                    break;
                }

                // The identifier lookahead's decision point can sit one
                // character past the name; the trailing space keeps it on
                // the line.
                let mut source = line.to_string();
                source.push(' ');

                match run_line(&source, &mut environment) {
                    Ok(value) => println!("{}", value),
                    Err(error) => error.report(&source, None),
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

/// Runs one line through the whole pipeline: lex, parse against the
/// environment, evaluate against the environment. Expects the trailing
/// space the shell appends.
pub fn run_line(source: &str, environment: &mut Environment) -> Result<Value, CalcError> {
    let mut lexer = Lexer::new(source.to_string());
    let tokens = lexer.scan_tokens()?;

    let mut parser = Parser::new(tokens, environment);
    let statement = parser.parse()?;

    let mut evaluator = Evaluator::new(environment);
    evaluator.evaluate(&statement)
}
