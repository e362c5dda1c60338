//! Source location tracking.
//!
//! Tokens carry a byte [`Span`]; tree nodes carry a resolved [`Loc`] with
//! 1-based lines and 0-based columns. Resolution goes through a [`LineIndex`]
//! built once per source text.

use serde::Serialize;

/// A span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the start.
    pub start: usize,
    /// Byte offset of the end (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A resolved line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column in UTF-16 code units from the last line break, starting at 0.
    pub column: usize,
}

impl Position {
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The `loc` attached to every tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loc {
    /// The exact source text the node was parsed from.
    pub source: String,
    pub start: Position,
    pub end: Position,
}

/// Maps byte offsets to line/column positions.
///
/// Recognised line breaks are `\r\n` (a single break), `\r`, `\n`,
/// U+2028 and U+2029. Offsets stay in bytes; columns are reported in UTF-16
/// code units.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    /// Byte offsets of the start of each line.
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Build a line index from source code.
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '\r' => {
                    if let Some(&(_, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(i + 2);
                    } else {
                        line_starts.push(i + 1);
                    }
                }
                '\n' => line_starts.push(i + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(i + c.len_utf8()),
                _ => {}
            }
        }
        Self { source, line_starts }
    }

    /// Resolve a byte offset to a [`Position`].
    pub fn position(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map_or(offset - line_start, |text| text.encode_utf16().count());
        Position::new(line + 1, column)
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Whether `c` terminates a line.
#[inline]
pub(crate) fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Whether `text` contains any line break.
pub(crate) fn contains_line_break(text: &str) -> bool {
    text.chars().any(is_line_break)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let source = "line1\nline2\nline3";
        let index = LineIndex::new(source);

        assert_eq!(index.position(0), Position::new(1, 0));
        assert_eq!(index.position(5), Position::new(1, 5)); // '\n' after line1
        assert_eq!(index.position(6), Position::new(2, 0));
        assert_eq!(index.position(12), Position::new(3, 0));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_crlf_is_one_break() {
        let index = LineIndex::new("a\r\nb\rc");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.position(3), Position::new(2, 0));
        assert_eq!(index.position(5), Position::new(3, 0));
    }

    #[test]
    fn test_unicode_separators() {
        let source = "a\u{2028}b\u{2029}c";
        let index = LineIndex::new(source);
        let b = source.find('b').unwrap();
        let c = source.find('c').unwrap();
        assert_eq!(index.position(b), Position::new(2, 0));
        assert_eq!(index.position(c), Position::new(3, 0));
    }

    #[test]
    fn test_columns_count_utf16_units() {
        let source = "s = '\u{e9}\u{20ac}'; x";
        let index = LineIndex::new(source);
        let x = source.find('x').unwrap();
        assert_eq!(x, 13);
        assert_eq!(index.position(x), Position::new(1, 10));

        // Astral characters take two units.
        let source = "a\n'\u{1f600}' b";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source.find('b').unwrap()), Position::new(2, 5));
    }

    #[test]
    fn test_end_of_input() {
        let index = LineIndex::new("ab\n");
        assert_eq!(index.position(3), Position::new(2, 0));
        assert_eq!(index.position(2), Position::new(1, 2));
    }

    #[test]
    fn test_contains_line_break() {
        assert!(contains_line_break("  \n "));
        assert!(contains_line_break("/* \r */"));
        assert!(!contains_line_break("  /* x */ "));
    }
}
