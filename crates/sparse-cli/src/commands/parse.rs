//! `sparse parse` command implementation.
//!
//! Prints the syntax tree of one input as JSON.

use miette::{IntoDiagnostic, Result};
use sparse_parser::{parse_with_options, ParserOptions};
use std::path::Path;

use super::Input;

/// Run the parse command.
///
/// The tree is always JSON; `compact` selects a single line. On failure
/// `json` chooses between a JSON error object on stdout and a rendered
/// diagnostic on stderr.
pub fn run(path: &Path, options: ParserOptions, compact: bool, json: bool) -> Result<()> {
    let input = Input::read(path).into_diagnostic()?;
    let _span = tracing::info_span!("parse", file = %input.name).entered();

    let program = match parse_with_options(&input.text, options) {
        Ok(program) => program,
        Err(err) => return super::fail(&input, &err, json),
    };

    let out = if compact {
        program.to_json()
    } else {
        program.to_json_pretty()
    }
    .into_diagnostic()?;
    println!("{out}");
    Ok(())
}
