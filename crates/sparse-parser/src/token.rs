//! Token types.
//!
//! The vocabulary is closed: every keyword and operator spelling the lexer can
//! produce has its own variant, so the parser matches on enums rather than on
//! strings.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::span::Span;

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token.
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{} {} {}",
            self.span.start,
            self.span.end,
            self.kind.label(),
            self.kind.value_text()
        )
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// Number literal: `42`, `3.14`, `0xff`, `017`
    Number(f64),
    /// String literal with escapes decoded
    String(String),
    /// Regular expression. `pattern` keeps its delimiting slashes.
    Regex { pattern: String, flags: String },
    /// Identifier: `foo`, `_bar`, `$baz`
    Identifier(String),

    // === Special literal words ===
    This,
    Null,
    Undefined,
    True,
    False,

    /// Statement keyword
    Keyword(Keyword),
    /// Operator, including `.`, `?` and the operator keywords
    Operator(Operator),

    // === Punctuation ===
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Semicolon,
    Comma,
    Colon,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            TokenKind::Number(_) => "num",
            TokenKind::String(_) => "string",
            TokenKind::Regex { .. } => "regx",
            TokenKind::Identifier(_) => "name",
            TokenKind::This => "this",
            TokenKind::Null => "null",
            TokenKind::Undefined => "undefined",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Operator(_) => "operator",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Eof => "eof",
        }
    }

    /// The token's value as it appears in diagnostics.
    pub fn value_text(&self) -> String {
        match self {
            TokenKind::Number(n) => format_number(*n),
            TokenKind::String(s) | TokenKind::Identifier(s) => s.clone(),
            TokenKind::Regex { pattern, flags } => format!("{pattern}{flags}"),
            TokenKind::Keyword(kw) => kw.as_str().to_string(),
            TokenKind::Operator(op) => op.as_str().to_string(),
            TokenKind::Eof => "undefined".to_string(),
            other => other.label().to_string(),
        }
    }

    /// Whether this token is a literal the parser turns into a `Literal` node.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Number(_)
                | TokenKind::String(_)
                | TokenKind::Regex { .. }
                | TokenKind::Null
                | TokenKind::Undefined
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Whether an operand is complete after this token, so that a following
    /// `/` reads as division.
    pub fn ends_operand(&self) -> bool {
        self.is_literal()
            || matches!(
                self,
                TokenKind::Identifier(_)
                    | TokenKind::This
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
            )
    }

    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(kw) if *kw == keyword)
    }

    #[inline]
    pub fn is_operator(&self, operator: Operator) -> bool {
        matches!(self, TokenKind::Operator(op) if *op == operator)
    }
}

/// Statement keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Break,
    Case,
    Catch,
    Continue,
    Debugger,
    Default,
    Do,
    Else,
    Finally,
    For,
    Function,
    If,
    Return,
    Switch,
    Throw,
    Try,
    Var,
    While,
    With,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "catch" => Keyword::Catch,
            "continue" => Keyword::Continue,
            "debugger" => Keyword::Debugger,
            "default" => Keyword::Default,
            "do" => Keyword::Do,
            "else" => Keyword::Else,
            "finally" => Keyword::Finally,
            "for" => Keyword::For,
            "function" => Keyword::Function,
            "if" => Keyword::If,
            "return" => Keyword::Return,
            "switch" => Keyword::Switch,
            "throw" => Keyword::Throw,
            "try" => Keyword::Try,
            "var" => Keyword::Var,
            "while" => Keyword::While,
            "with" => Keyword::With,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Catch => "catch",
            Keyword::Continue => "continue",
            Keyword::Debugger => "debugger",
            Keyword::Default => "default",
            Keyword::Do => "do",
            Keyword::Else => "else",
            Keyword::Finally => "finally",
            Keyword::For => "for",
            Keyword::Function => "function",
            Keyword::If => "if",
            Keyword::Return => "return",
            Keyword::Switch => "switch",
            Keyword::Throw => "throw",
            Keyword::Try => "try",
            Keyword::Var => "var",
            Keyword::While => "while",
            Keyword::With => "with",
        }
    }
}

/// Every operator spelling, symbolic or keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Member / conditional
    Dot,      // .
    Question, // ?

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    StarStar,   // **
    PlusPlus,   // ++
    MinusMinus, // --

    // Comparison
    EqEq,     // ==
    EqEqEq,   // ===
    BangEq,   // !=
    BangEqEq, // !==
    Lt,       // <
    LtEq,     // <=
    Gt,       // >
    GtEq,     // >=

    // Bitwise
    Amp,    // &
    Pipe,   // |
    Caret,  // ^
    Tilde,  // ~
    LtLt,   // <<
    GtGt,   // >>
    GtGtGt, // >>>

    // Logical
    AmpAmp,   // &&
    PipePipe, // ||
    Bang,     // !

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    LtLtEq,    // <<=
    GtGtEq,    // >>=
    GtGtGtEq,  // >>>=
    AmpEq,     // &=
    PipeEq,    // |=
    CaretEq,   // ^=

    // Operator keywords
    In,
    Instanceof,
    Typeof,
    Void,
    Delete,
    New,
}

impl Operator {
    /// Longest symbolic operator spelling, in bytes.
    pub const MAX_PUNCTUATION_LEN: usize = 4;

    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Dot => ".",
            Operator::Question => "?",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::StarStar => "**",
            Operator::PlusPlus => "++",
            Operator::MinusMinus => "--",
            Operator::EqEq => "==",
            Operator::EqEqEq => "===",
            Operator::BangEq => "!=",
            Operator::BangEqEq => "!==",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Amp => "&",
            Operator::Pipe => "|",
            Operator::Caret => "^",
            Operator::Tilde => "~",
            Operator::LtLt => "<<",
            Operator::GtGt => ">>",
            Operator::GtGtGt => ">>>",
            Operator::AmpAmp => "&&",
            Operator::PipePipe => "||",
            Operator::Bang => "!",
            Operator::Eq => "=",
            Operator::PlusEq => "+=",
            Operator::MinusEq => "-=",
            Operator::StarEq => "*=",
            Operator::SlashEq => "/=",
            Operator::PercentEq => "%=",
            Operator::LtLtEq => "<<=",
            Operator::GtGtEq => ">>=",
            Operator::GtGtGtEq => ">>>=",
            Operator::AmpEq => "&=",
            Operator::PipeEq => "|=",
            Operator::CaretEq => "^=",
            Operator::In => "in",
            Operator::Instanceof => "instanceof",
            Operator::Typeof => "typeof",
            Operator::Void => "void",
            Operator::Delete => "delete",
            Operator::New => "new",
        }
    }

    /// Look up a symbolic operator spelling. `.` is handled by the lexer
    /// separately because it may start a number.
    pub fn from_punctuation(text: &str) -> Option<Self> {
        Some(match text {
            "?" => Operator::Question,
            "+" => Operator::Plus,
            "-" => Operator::Minus,
            "*" => Operator::Star,
            "/" => Operator::Slash,
            "%" => Operator::Percent,
            "**" => Operator::StarStar,
            "++" => Operator::PlusPlus,
            "--" => Operator::MinusMinus,
            "==" => Operator::EqEq,
            "===" => Operator::EqEqEq,
            "!=" => Operator::BangEq,
            "!==" => Operator::BangEqEq,
            "<" => Operator::Lt,
            "<=" => Operator::LtEq,
            ">" => Operator::Gt,
            ">=" => Operator::GtEq,
            "&" => Operator::Amp,
            "|" => Operator::Pipe,
            "^" => Operator::Caret,
            "~" => Operator::Tilde,
            "<<" => Operator::LtLt,
            ">>" => Operator::GtGt,
            ">>>" => Operator::GtGtGt,
            "&&" => Operator::AmpAmp,
            "||" => Operator::PipePipe,
            "!" => Operator::Bang,
            "=" => Operator::Eq,
            "+=" => Operator::PlusEq,
            "-=" => Operator::MinusEq,
            "*=" => Operator::StarEq,
            "/=" => Operator::SlashEq,
            "%=" => Operator::PercentEq,
            "<<=" => Operator::LtLtEq,
            ">>=" => Operator::GtGtEq,
            ">>>=" => Operator::GtGtGtEq,
            "&=" => Operator::AmpEq,
            "|=" => Operator::PipeEq,
            "^=" => Operator::CaretEq,
            _ => return None,
        })
    }

    /// Look up an operator keyword (`in`, `typeof`, ...).
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "in" => Operator::In,
            "instanceof" => Operator::Instanceof,
            "typeof" => Operator::Typeof,
            "void" => Operator::Void,
            "delete" => Operator::Delete,
            "new" => Operator::New,
            _ => return None,
        })
    }

    /// Operators folded into a `binaryExpression`.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Operator::EqEq
                | Operator::BangEq
                | Operator::EqEqEq
                | Operator::BangEqEq
                | Operator::Lt
                | Operator::LtEq
                | Operator::Gt
                | Operator::GtEq
                | Operator::LtLt
                | Operator::GtGt
                | Operator::GtGtGt
                | Operator::Plus
                | Operator::Minus
                | Operator::Star
                | Operator::Slash
                | Operator::Percent
                | Operator::StarStar
                | Operator::Pipe
                | Operator::Caret
                | Operator::Amp
                | Operator::In
                | Operator::Instanceof
        )
    }

    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::PlusEq
                | Operator::MinusEq
                | Operator::StarEq
                | Operator::SlashEq
                | Operator::PercentEq
                | Operator::LtLtEq
                | Operator::GtGtEq
                | Operator::GtGtGtEq
                | Operator::PipeEq
                | Operator::CaretEq
                | Operator::AmpEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::AmpAmp | Operator::PipePipe)
    }

    pub fn is_update(self) -> bool {
        matches!(self, Operator::PlusPlus | Operator::MinusMinus)
    }

    /// Operators allowed in prefix position.
    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            Operator::Bang
                | Operator::Tilde
                | Operator::Plus
                | Operator::Minus
                | Operator::PlusPlus
                | Operator::MinusMinus
                | Operator::Typeof
                | Operator::Void
                | Operator::Delete
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Render a number the way it appears in messages.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n.is_sign_positive() { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}
