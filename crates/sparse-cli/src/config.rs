use serde::{Deserialize, Serialize};
use sparse_parser::{CodegenOptions, ParserOptions};
use std::path::Path;

use crate::error::Error;

/// Runtime configuration for the sparse CLI.
///
/// Loaded from a JSON file when `--config` is given; explicit flags are
/// applied on top with the `with_*` builders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = WARN, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Options handed to the parser.
    pub parser: ParserOptions,

    /// Indent string used by `print` (default: two spaces).
    pub indent: Option<String>,
}

impl Config {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set the parser nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.parser = self.parser.with_max_depth(max_depth);
        self
    }

    /// Printer options for the `print` command.
    pub fn codegen_options(&self, minify: bool) -> CodegenOptions {
        CodegenOptions {
            minify,
            indent: self.indent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.verbosity, 0);
        assert!(!config.json_logs);
        assert_eq!(config.parser.max_depth, sparse_parser::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_verbosity(2)
            .with_json_logs(true)
            .with_max_depth(8);
        assert_eq!(config.verbosity, 2);
        assert!(config.json_logs);
        assert_eq!(config.parser.max_depth, 8);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"parser": {{"max_depth": 12}}, "indent": "\t"}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.parser.max_depth, 12);
        assert_eq!(config.indent.as_deref(), Some("\t"));
        assert_eq!(config.verbosity, 0);
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/nonexistent/sparse.json")).unwrap_err();
        assert!(matches!(missing, Error::ConfigRead { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let invalid = Config::load(file.path()).unwrap_err();
        assert!(matches!(invalid, Error::ConfigParse { .. }));
    }
}
