//! `sparse check` command implementation.
//!
//! Parses each file on its own and reports the ones that fail.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use sparse_parser::{parse_with_options, ParseError, ParserOptions};
use std::path::PathBuf;

use super::Input;

#[derive(Serialize)]
struct CheckResult {
    file: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ParseError>,
    /// Set when the file could not be read at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    io_error: Option<String>,
}

#[derive(Serialize)]
struct CheckReport {
    ok: bool,
    checked: usize,
    failed: usize,
    results: Vec<CheckResult>,
}

/// Run the check command. Exits with status 1 if any file failed.
pub fn run(files: &[PathBuf], options: ParserOptions, json: bool) -> Result<()> {
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let result = match Input::read(path) {
            Ok(input) => {
                let error = parse_with_options(&input.text, options).err();
                if let (Some(err), false) = (&error, json) {
                    super::render(&input, err);
                }
                CheckResult {
                    file: input.name,
                    ok: error.is_none(),
                    error,
                    io_error: None,
                }
            }
            Err(err) => {
                if !json {
                    eprintln!("error: {err}");
                }
                CheckResult {
                    file: path.display().to_string(),
                    ok: false,
                    error: None,
                    io_error: Some(err.to_string()),
                }
            }
        };
        tracing::debug!(file = %result.file, ok = result.ok, "checked");
        results.push(result);
    }

    let failed = results.iter().filter(|r| !r.ok).count();
    let report = CheckReport {
        ok: failed == 0,
        checked: results.len(),
        failed,
        results,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else {
        println!("checked {} file(s), {} failed", report.checked, report.failed);
    }

    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}
