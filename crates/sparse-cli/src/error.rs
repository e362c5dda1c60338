use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use sparse_parser::ParseError;
use thiserror::Error;

/// Failures outside the parser: reading inputs and configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read standard input: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A parse failure rendered against its source text.
#[derive(Error, Debug, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(sparse::parse))]
pub struct SourceDiagnostic {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
}

impl SourceDiagnostic {
    pub fn new(name: &str, source: &str, err: &ParseError) -> Self {
        let offset = err.offset.min(source.len());
        let len = source
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        Self {
            message: err.to_string(),
            src: NamedSource::new(name, source.to_string()),
            span: (offset, len).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_covers_one_character() {
        let source = "var = 1;";
        let err = sparse_parser::parse(source).unwrap_err();
        let diag = SourceDiagnostic::new("input.js", source, &err);
        assert_eq!(diag.span.offset(), 4);
        assert_eq!(diag.span.len(), 1);
        assert!(diag.to_string().starts_with("Unexpected token: operator(=)"));
    }

    #[test]
    fn test_span_at_end_of_input_is_empty() {
        let source = "a +";
        let err = sparse_parser::parse(source).unwrap_err();
        let diag = SourceDiagnostic::new("input.js", source, &err);
        assert_eq!(diag.span.offset(), 3);
        assert_eq!(diag.span.len(), 0);
    }
}
