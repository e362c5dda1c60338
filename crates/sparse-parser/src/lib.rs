//! sparse-parser: single-pass front end for a small JavaScript subset.
//!
//! # Design
//!
//! 1. **Lexing on demand**
//!    - The parser pulls one token at a time and tells the lexer whether an
//!      operator may come next, which decides `a / b` versus `/re/`
//!    - No token buffer; lookahead is resolved inside the lexer
//!
//! 2. **Precedence climbing**
//!    - One expression reader driven by the table in [`priority`]
//!    - Parenthesized groups are kept in the tree as sequence nodes
//!
//! 3. **Inferred statement ends**
//!    - A statement ends at `;`, `}`, end of input, or a line break
//!
//! 4. **First error wins**
//!    - Every failure is fatal and carries a resolved line and column
//!
//! # Example
//!
//! ```
//! use sparse_parser::{parse, Stmt};
//!
//! let program = parse("var x = 1 + 2;").unwrap();
//! assert!(matches!(program.body[0], Stmt::Var(_)));
//! println!("{}", program.to_json_pretty().unwrap());
//! ```

mod ast;
mod codegen;
mod error;
mod lexer;
mod parser;
pub mod priority;
mod span;
mod token;

// Re-exports
pub use ast::*;
pub use codegen::{Codegen, CodegenOptions};
pub use error::{format_message, messages, ErrorKind, ParseError};
pub use lexer::{tokenize, Lexer};
pub use parser::{Parser, ParserOptions, DEFAULT_MAX_DEPTH};
pub use span::{LineIndex, Loc, Position, Span};
pub use token::{Keyword, Operator, Token, TokenKind};

/// Parse source text with default options.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    parse_with_options(source, ParserOptions::default())
}

/// Parse source text.
pub fn parse_with_options(source: &str, options: ParserOptions) -> Result<Program, ParseError> {
    Parser::new(source, options).parse()
}

/// Parse and print the tree back as source text.
pub fn transform(source: &str, parser_opts: ParserOptions, codegen_opts: CodegenOptions) -> Result<String, ParseError> {
    let program = parse_with_options(source, parser_opts)?;
    Ok(Codegen::new(&program, codegen_opts).generate())
}
