//! Operator binding strengths.
//!
//! Higher binds tighter. The expression reader keeps folding operators while
//! their priority is strictly greater than the caller's minimum, which makes
//! binary operators left-associative; assignment reads its right side at
//! `ASSIGNMENT - 1` to become right-associative.

use crate::token::{Operator, TokenKind};

/// Whether `+`, `-`, `++` and `--` are being read before or after an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Infix,
}

pub const CALL: u8 = 20;
pub const MEMBER: u8 = 19;
pub const POSTFIX: u8 = 17;
pub const UNARY: u8 = 16;
pub const EXPONENT: u8 = 15;
pub const MULTIPLICATIVE: u8 = 14;
pub const ADDITIVE: u8 = 13;
pub const SHIFT: u8 = 12;
pub const RELATIONAL: u8 = 11;
pub const EQUALITY: u8 = 10;
pub const BITWISE_AND: u8 = 9;
pub const BITWISE_XOR: u8 = 8;
pub const BITWISE_OR: u8 = 7;
pub const LOGICAL_AND: u8 = 6;
pub const LOGICAL_OR: u8 = 5;
pub const CONDITIONAL: u8 = 4;
pub const ASSIGNMENT: u8 = 3;

/// Binding strength of an operator.
pub const fn priority(op: Operator, fixity: Fixity) -> u8 {
    let prefix = matches!(fixity, Fixity::Prefix);
    match op {
        Operator::Dot | Operator::New => MEMBER,
        Operator::PlusPlus | Operator::MinusMinus => {
            if prefix {
                UNARY
            } else {
                POSTFIX
            }
        }
        Operator::Plus | Operator::Minus => {
            if prefix {
                UNARY
            } else {
                ADDITIVE
            }
        }
        Operator::Bang | Operator::Tilde | Operator::Typeof | Operator::Void | Operator::Delete => UNARY,
        Operator::StarStar => EXPONENT,
        Operator::Star | Operator::Slash | Operator::Percent => MULTIPLICATIVE,
        Operator::LtLt | Operator::GtGt | Operator::GtGtGt => SHIFT,
        Operator::Lt
        | Operator::LtEq
        | Operator::Gt
        | Operator::GtEq
        | Operator::In
        | Operator::Instanceof => RELATIONAL,
        Operator::EqEq | Operator::BangEq | Operator::EqEqEq | Operator::BangEqEq => EQUALITY,
        Operator::Amp => BITWISE_AND,
        Operator::Caret => BITWISE_XOR,
        Operator::Pipe => BITWISE_OR,
        Operator::AmpAmp => LOGICAL_AND,
        Operator::PipePipe => LOGICAL_OR,
        Operator::Question => CONDITIONAL,
        Operator::Eq
        | Operator::PlusEq
        | Operator::MinusEq
        | Operator::StarEq
        | Operator::SlashEq
        | Operator::PercentEq
        | Operator::LtLtEq
        | Operator::GtGtEq
        | Operator::GtGtGtEq
        | Operator::AmpEq
        | Operator::PipeEq
        | Operator::CaretEq => ASSIGNMENT,
    }
}

/// Priority of the current token when it follows an operand, or `None` if the
/// token cannot continue an expression.
pub fn infix_priority(kind: &TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Operator(op) => Some(priority(*op, Fixity::Infix)),
        TokenKind::LParen => Some(CALL),
        TokenKind::LBracket => Some(MEMBER),
        _ => None,
    }
}
