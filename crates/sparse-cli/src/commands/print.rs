//! `sparse print` command implementation.

use miette::{IntoDiagnostic, Result};
use sparse_parser::{parse_with_options, Codegen, CodegenOptions, ParserOptions};
use std::io::Write;
use std::path::Path;

use super::Input;

/// Run the print command: parse, then write the regenerated source.
pub fn run(path: &Path, parser: ParserOptions, codegen: CodegenOptions, json: bool) -> Result<()> {
    let input = Input::read(path).into_diagnostic()?;
    let program = match parse_with_options(&input.text, parser) {
        Ok(program) => program,
        Err(err) => return super::fail(&input, &err, json),
    };

    let output = Codegen::new(&program, codegen).generate();
    let mut out = std::io::stdout().lock();
    out.write_all(output.as_bytes()).into_diagnostic()?;
    if !output.ends_with('\n') {
        out.write_all(b"\n").into_diagnostic()?;
    }
    Ok(())
}
