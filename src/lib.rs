// rafmath interpreter library
//
// An interactive expression calculator: one line of input is scanned into
// tokens, parsed into a single expression tree and walked to a value.
// Variables live in an Environment owned by the session and injected into
// both the parse step and the evaluation step.

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod value;

// Re-export commonly used items
pub use ast::Expr;
pub use error::{CalcError, Span};
pub use evaluator::{Environment, Evaluator};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use value::Value;

// Re-export main functions
pub use repl::{run_line, start as start_repl};
