//! `sparse tokens` command implementation.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use sparse_parser::{tokenize, Token};
use std::path::Path;

use super::Input;

#[derive(Serialize)]
struct TokenRecord {
    kind: &'static str,
    value: String,
    start: usize,
    end: usize,
}

impl From<&Token> for TokenRecord {
    fn from(token: &Token) -> Self {
        Self {
            kind: token.kind.label(),
            value: token.kind.value_text(),
            start: token.span.start,
            end: token.span.end,
        }
    }
}

/// Run the tokens command.
///
/// Prints `start..end kind value` per token, or a JSON array with `json`.
pub fn run(path: &Path, json: bool) -> Result<()> {
    let input = Input::read(path).into_diagnostic()?;
    let tokens = match tokenize(&input.text) {
        Ok(tokens) => tokens,
        Err(err) => return super::fail(&input, &err, json),
    };
    tracing::debug!(count = tokens.len(), "tokenized");

    if json {
        let records: Vec<TokenRecord> = tokens.iter().map(TokenRecord::from).collect();
        println!("{}", serde_json::to_string_pretty(&records).into_diagnostic()?);
    } else {
        for token in &tokens {
            println!("{token}");
        }
    }
    Ok(())
}
