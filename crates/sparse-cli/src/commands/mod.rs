pub mod check;
pub mod parse;
pub mod print;
pub mod tokens;
pub mod version;

use std::io::Read;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use sparse_parser::ParseError;

use crate::error::{Error, SourceDiagnostic};

/// A source text and the name it is reported under.
#[derive(Debug)]
pub struct Input {
    pub name: String,
    pub text: String,
}

impl Input {
    /// Read a file, or standard input when the path is `-`.
    pub fn read(path: &Path) -> Result<Self, Error> {
        if path == Path::new("-") {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(Error::Stdin)?;
            return Ok(Self {
                name: "<stdin>".to_string(),
                text,
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| Error::ReadInput {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(Self {
            name: path.display().to_string(),
            text,
        })
    }
}

/// JSON shape of a failed parse.
#[derive(Serialize)]
pub struct Failure<'a> {
    pub ok: bool,
    pub file: &'a str,
    pub error: &'a ParseError,
}

impl<'a> Failure<'a> {
    pub fn new(file: &'a str, error: &'a ParseError) -> Self {
        Self {
            ok: false,
            file,
            error,
        }
    }
}

/// Report a parse failure, as JSON on stdout or as a rendered diagnostic on
/// stderr, then exit with status 1.
pub fn fail(input: &Input, err: &ParseError, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(&Failure::new(&input.name, err)).into_diagnostic()?;
        println!("{out}");
    } else {
        render(input, err);
    }
    std::process::exit(1);
}

/// Print a parse failure with its source snippet to stderr.
pub fn render(input: &Input, err: &ParseError) {
    let report = miette::Report::new(SourceDiagnostic::new(&input.name, &input.text, err));
    eprintln!("{report:?}");
}
