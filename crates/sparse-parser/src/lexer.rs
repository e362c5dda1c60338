//! Lexer (tokenizer).
//!
//! The lexer is driven one token at a time by the parser rather than run
//! upfront. The caller says whether an operator is expected at this point,
//! which is what separates `a / b` from `/re/`.

use crate::error::{format_message, messages, ErrorKind, ParseError};
use crate::span::{is_line_break, LineIndex, Span};
use crate::token::{Keyword, Operator, Token, TokenKind};

/// The lexer state.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    /// Current byte position.
    pos: usize,
    /// Start position of the current token.
    token_start: usize,
    line_index: LineIndex<'a>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            token_start: 0,
            line_index: LineIndex::new(source),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn line_index(&self) -> &LineIndex<'a> {
        &self.line_index
    }

    /// Skip whitespace and comments, then read exactly one token.
    ///
    /// `expect_operator` is true when an operand has just been completed; a
    /// `/` is then division rather than the start of a regex literal.
    pub fn next_token(&mut self, expect_operator: bool) -> Result<Token, ParseError> {
        self.skip_whitespace_and_comments()?;
        self.token_start = self.pos;

        let Some(ch) = self.current() else {
            return Ok(self.make_token(TokenKind::Eof));
        };

        let kind = match ch {
            c if is_ident_start(c) => self.scan_word(),

            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ':' => self.single(TokenKind::Colon),

            '"' | '\'' => self.scan_string(ch)?,

            '0' => match self.peek_byte(1) {
                b'x' | b'X' => self.scan_hex_number()?,
                b'.' | b'e' | b'E' => self.scan_decimal_number()?,
                _ => self.scan_octal_number()?,
            },
            '1'..='9' => self.scan_decimal_number()?,

            '.' if self.peek_byte(1).is_ascii_digit() => self.scan_decimal_number()?,
            '.' => self.single(TokenKind::Operator(Operator::Dot)),

            '/' if !expect_operator => self.scan_regex()?,
            '/' | '+' | '-' | '*' | '?' | '%' | '=' | '!' | '<' | '>' | '&' | '|' | '~' | '^' => {
                self.scan_operator()?
            }

            other => {
                return Err(self.raise(
                    self.pos,
                    ErrorKind::Lexical,
                    messages::UNEXPECTED_CHARACTER,
                    &[&other.to_string()],
                ))
            }
        };

        Ok(self.make_token(kind))
    }

    /// Build a positioned error.
    pub(crate) fn raise(&self, offset: usize, kind: ErrorKind, template: &str, args: &[&str]) -> ParseError {
        ParseError::new(
            kind,
            format_message(template, args),
            offset,
            self.line_index.position(offset),
        )
    }

    // === Helper methods ===

    fn current(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_byte(&self, n: usize) -> u8 {
        self.source.as_bytes().get(self.pos + n).copied().unwrap_or(0)
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.token_start, self.pos))
    }

    fn lexical_error(&self, offset: usize, template: &str) -> ParseError {
        self.raise(offset, ErrorKind::Lexical, template, &[])
    }

    // === Whitespace and comments ===

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            match self.current() {
                Some(c) if is_whitespace(c) => self.pos += c.len_utf8(),
                Some('/') if self.peek_byte(1) == b'/' => self.skip_line_comment(),
                Some('/') if self.peek_byte(1) == b'*' => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        self.pos += 2;
        while let Some(c) = self.current() {
            if is_line_break(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 2;
        match self.source[self.pos..].find("*/") {
            Some(end) => {
                self.pos += end + 2;
                Ok(())
            }
            None => Err(self.lexical_error(start, messages::UNTERMINATED_COMMENT)),
        }
    }

    // === Token scanning ===

    fn scan_word(&mut self) -> TokenKind {
        let start = self.pos;
        while self.current().is_some_and(is_ident_part) {
            self.advance();
        }
        let word = &self.source[start..self.pos];

        if let Some(op) = Operator::from_word(word) {
            return TokenKind::Operator(op);
        }
        match word {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            "this" => TokenKind::This,
            _ => Keyword::from_word(word)
                .map(TokenKind::Keyword)
                .unwrap_or_else(|| TokenKind::Identifier(word.to_string())),
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        let mut value = String::new();
        loop {
            let Some(c) = self.current() else {
                return Err(self.lexical_error(start, messages::UNTERMINATED_STRING));
            };
            self.pos += c.len_utf8();

            if c == quote {
                return Ok(TokenKind::String(value));
            }
            if c != '\\' {
                value.push(c);
                continue;
            }

            let Some(escaped) = self.current() else {
                return Err(self.lexical_error(start, messages::UNTERMINATED_STRING));
            };
            self.pos += escaped.len_utf8();
            match escaped {
                'n' => value.push('\n'),
                'f' => value.push('\u{c}'),
                'r' => value.push('\r'),
                't' => value.push('\t'),
                'v' => value.push('\u{b}'),
                'u' => value.push(self.scan_unicode_escape(start)?),
                other => value.push(other),
            }
        }
    }

    /// Decode the four hex digits after `\u`. A high surrogate immediately
    /// followed by an escaped low surrogate combines into one scalar value.
    fn scan_unicode_escape(&mut self, token_start: usize) -> Result<char, ParseError> {
        let high = self
            .read_hex4()
            .ok_or_else(|| self.lexical_error(token_start, messages::INVALID_UNICODE_ESCAPE))?;

        if (0xD800..=0xDBFF).contains(&high) && self.source[self.pos..].starts_with("\\u") {
            let saved = self.pos;
            self.pos += 2;
            match self.read_hex4() {
                Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                _ => self.pos = saved,
            }
        }

        Ok(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let digits = self.source.get(self.pos..self.pos + 4)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        self.pos += 4;
        u32::from_str_radix(digits, 16).ok()
    }

    fn scan_hex_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.pos += 2; // Skip 0x
        let digits_start = self.pos;

        while let Some(c) = self.current() {
            if c.is_ascii_hexdigit() {
                self.advance();
            } else if is_ident_start(c) {
                return Err(self.lexical_error(start, messages::INVALID_NUMBER));
            } else {
                break;
            }
        }

        let digits = &self.source[digits_start..self.pos];
        if digits.is_empty() {
            return Err(self.lexical_error(start, messages::INVALID_NUMBER));
        }
        Ok(TokenKind::Number(fold_digits(digits, 16)))
    }

    /// A leading `0` followed by digits. Any `8` or `9` turns the whole
    /// literal back into a decimal.
    fn scan_octal_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.advance(); // Skip 0
        let digits_start = self.pos;

        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                self.advance();
            } else if is_ident_start(c) {
                return Err(self.lexical_error(start, messages::INVALID_NUMBER));
            } else {
                break;
            }
        }

        let digits = &self.source[digits_start..self.pos];
        let radix = if digits.bytes().any(|b| b == b'8' || b == b'9') { 10 } else { 8 };
        Ok(TokenKind::Number(fold_digits(digits, radix)))
    }

    fn scan_decimal_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let mut has_point = false;
        let mut has_exp = false;
        let mut exp_complete = true;

        while let Some(c) = self.current() {
            match c {
                '0'..='9' => {
                    self.advance();
                    exp_complete = true;
                }
                '.' => {
                    if has_point || has_exp {
                        break;
                    }
                    has_point = true;
                    self.advance();
                }
                'e' | 'E' => {
                    if has_exp {
                        return Err(self.lexical_error(start, messages::INVALID_NUMBER));
                    }
                    has_exp = true;
                    exp_complete = false;
                    self.advance();
                    if matches!(self.peek_byte(0), b'+' | b'-') {
                        self.advance();
                    }
                }
                c if is_ident_part(c) => {
                    return Err(self.lexical_error(start, messages::INVALID_NUMBER));
                }
                _ => break,
            }
        }

        if !exp_complete {
            return Err(self.lexical_error(start, messages::INVALID_NUMBER));
        }

        self.source[start..self.pos]
            .parse()
            .map(TokenKind::Number)
            .map_err(|_| self.lexical_error(start, messages::INVALID_NUMBER))
    }

    /// Scan a regex literal. Only syntax needed to find the end is checked.
    fn scan_regex(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.advance(); // Skip opening /

        // Open `(` and `[`; a `/` inside a class does not terminate.
        let mut groups: Vec<char> = Vec::new();
        let mut escaped = false;
        loop {
            let c = match self.current() {
                Some(c) if !is_line_break(c) => c,
                _ => return Err(self.lexical_error(start, messages::UNTERMINATED_REGEX)),
            };
            self.advance();

            if escaped {
                escaped = false;
                continue;
            }
            let innermost = groups.last().copied();
            match c {
                '\\' => escaped = true,
                '/' if !groups.contains(&'[') => break,
                '(' | '[' if innermost != Some('[') => groups.push(c),
                ')' if innermost == Some('(') => {
                    groups.pop();
                }
                ']' if innermost == Some('[') => {
                    groups.pop();
                }
                _ => {}
            }
        }
        let pattern = self.source[start..self.pos].to_string();

        let mut flags = String::new();
        while let Some(c) = self.current() {
            match c {
                'g' | 'i' | 'm' if !flags.contains(c) => {
                    flags.push(c);
                    self.advance();
                }
                c if is_ident_start(c) => {
                    return Err(self.lexical_error(start, messages::INVALID_REGEX_FLAGS));
                }
                _ => break,
            }
        }

        Ok(TokenKind::Regex { pattern, flags })
    }

    /// Longest match over the operator spellings.
    fn scan_operator(&mut self) -> Result<TokenKind, ParseError> {
        for len in (1..=Operator::MAX_PUNCTUATION_LEN).rev() {
            let Some(text) = self.source.get(self.pos..self.pos + len) else {
                continue;
            };
            if let Some(op) = Operator::from_punctuation(text) {
                self.pos += len;
                return Ok(TokenKind::Operator(op));
            }
        }
        let ch = self.current().map(String::from).unwrap_or_default();
        Err(self.raise(self.pos, ErrorKind::Lexical, messages::UNEXPECTED_CHARACTER, &[&ch]))
    }
}

/// Tokenize a whole source text.
///
/// Operator context is inferred from the previous token, which matches what
/// the parser supplies for well-formed input.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut expect_operator = false;
    loop {
        let token = lexer.next_token(expect_operator)?;
        if token.kind == TokenKind::Eof {
            return Ok(tokens);
        }
        expect_operator = token.kind.ends_operand();
        tokens.push(token);
    }
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

#[inline]
fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[inline]
fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Accumulate in floating point so long literals saturate instead of
/// overflowing.
fn fold_digits(digits: &str, radix: u32) -> f64 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, digit| acc * f64::from(radix) + f64::from(digit))
}
