//! Parse errors and diagnostic message templates.
//!
//! Every failure is fatal to the parse that raised it. Messages are built from
//! a template with positional `{0}`, `{1}` placeholders and always carry the
//! resolved line and column of the offending input.

use serde::Serialize;
use thiserror::Error;

use crate::span::Position;

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed token: unterminated string/comment/regex, bad number,
    /// bad escape, bad regex flags, unrecognised character.
    Lexical,
    /// Well-formed tokens in an order the grammar does not accept.
    Syntax,
    /// Invalid target of an assignment or update operator.
    Reference,
}

/// A positioned parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} ({}:{})", .position.line, .position.column)]
pub struct ParseError {
    pub kind: ErrorKind,
    /// Message with placeholders already substituted.
    pub message: String,
    /// Byte offset the error was raised at.
    pub offset: usize,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, offset: usize, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            offset,
            position,
        }
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        self.kind == ErrorKind::Reference
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
///
/// Placeholders without a matching argument are left untouched.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match substituted {
            Some((arg, close)) => {
                result.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Diagnostic message templates.
pub mod messages {
    // Lexical
    pub const UNEXPECTED_CHARACTER: &str = "Unexpected character: {0}";
    pub const UNTERMINATED_COMMENT: &str = "Block comment missing \"*/\"";
    pub const UNTERMINATED_REGEX: &str = "Invalid regular expression: missing /";
    pub const INVALID_REGEX_FLAGS: &str = "Invalid regular expression flags";
    pub const INVALID_NUMBER: &str = "Invalid or unexpected token";
    pub const UNTERMINATED_STRING: &str = "Unterminated string constant";
    pub const INVALID_UNICODE_ESCAPE: &str = "Invalid Unicode escape sequence";

    // Syntax
    pub const UNEXPECTED_TOKEN: &str = "Unexpected token: {0}({1})";
    pub const UNEXPECTED_TOKEN_KIND: &str = "Unexpected token: {0}";
    pub const UNEXPECTED_OPERATOR: &str = "Unexpected operator: {0}";
    pub const UNKNOWN_OPERATOR: &str = "Unknown operator: {0}";
    pub const UNKNOWN_KEYWORD: &str = "Unknown keyword: {0}";
    pub const THROW_WITHOUT_ARGUMENT: &str = "throw statement needs an argument";
    pub const INVALID_JUMP_TARGET: &str = "Unexpected {0} or can't find valid label";
    pub const DUPLICATE_DEFAULT: &str = "More than one default clause in switch statement";
    pub const FOR_IN_MULTIPLE_BINDINGS: &str =
        "Invalid left-hand side in for-in loop: Must have a single binding";
    pub const DUPLICATE_LABEL: &str = "Label '{0}' is already declared";
    pub const NESTING_TOO_DEEP: &str = "Maximum nesting depth of {0} exceeded";

    // Reference
    pub const INVALID_ASSIGNMENT_TARGET: &str = "Invalid left-hand side expression in assignment";
    pub const INVALID_UPDATE_TARGET: &str = "Invalid expression in update operation";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message(messages::UNEXPECTED_TOKEN, &["name", "foo"]),
            "Unexpected token: name(foo)"
        );
        assert_eq!(format_message("{1} before {0}", &["a", "b"]), "b before a");
    }

    #[test]
    fn test_format_message_keeps_unmatched_braces() {
        assert_eq!(format_message("{0} {2} {x}", &["a"]), "a {2} {x}");
        assert_eq!(format_message("trailing {", &[]), "trailing {");
    }

    #[test]
    fn test_display_appends_position() {
        let err = ParseError::new(ErrorKind::Syntax, "Unexpected token: eof(undefined)", 4, Position::new(2, 3));
        assert_eq!(err.to_string(), "Unexpected token: eof(undefined) (2:3)");
        assert!(!err.is_reference());
    }
}
