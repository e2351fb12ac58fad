//! Target matching.
//!
//! Classifies one call expression or one enum declaration at a time. The
//! matcher only inspects; building replacements is the synthesizer's job.

use std::fmt;

use crate::pass::config::PassConfig;
use crate::syntax::{EnumDecl, EnumMember, Expr, ExprNode, MemberName, UnaryOp};

pub const SPOOF_MARKER: &str = "$spoof";
pub const UUID_MARKER: &str = "$uuid";
pub const SPOOF_ENUM_SUFFIX: &str = "_spoof";

/// Largest shared offset whose encoded codes stay exactly representable as
/// JavaScript numbers for every Unicode scalar value.
pub const MAX_SHARED_OFFSET: i64 = (1 << 53) - 1 - char::MAX as i64;

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RewriteTarget<'n> {
    /// `$spoof("s")`
    StringSpoof { text: &'n str },
    /// `$spoof("s", n)`; `offset` is the source node, reused verbatim.
    OffsetSpoof {
        text: &'n str,
        offset: &'n ExprNode,
        value: i64,
    },
    /// `$uuid()`
    Uuid,
    /// `enum Name_spoof { ... }`
    SpoofEnum { name: &'n str },
    NotATarget(Option<Rejection>),
}

/// The two string-spoofing forms, each behind its own switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpoofForm {
    PerCharacter,
    SharedOffset,
}

/// Why a marker call was left alone. Only reported when `verbose` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingArgument,
    NotAStringLiteral,
    TooManyArguments(usize),
    FormDisabled(SpoofForm),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingArgument => write!(f, "{SPOOF_MARKER} requires a parameter!"),
            Rejection::NotAStringLiteral => write!(f, "{SPOOF_MARKER} requires a string literal!"),
            Rejection::TooManyArguments(n) => {
                write!(f, "{SPOOF_MARKER} takes at most 2 arguments, got {n}!")
            }
            Rejection::FormDisabled(SpoofForm::PerCharacter) => {
                write!(f, "{SPOOF_MARKER}(string) is disabled by perCharacterOffsets = false")
            }
            Rejection::FormDisabled(SpoofForm::SharedOffset) => {
                write!(f, "{SPOOF_MARKER}(string, offset) is disabled by sharedOffset = false")
            }
        }
    }
}

/// Classify a call by its callee and arguments.
pub fn classify_call<'n>(
    callee: &'n ExprNode,
    args: &'n [ExprNode],
    config: &PassConfig,
) -> RewriteTarget<'n> {
    match callee.value.as_identifier() {
        Some(UUID_MARKER) => RewriteTarget::Uuid,
        Some(SPOOF_MARKER) => classify_spoof(args, config),
        _ => RewriteTarget::NotATarget(None),
    }
}

fn classify_spoof<'n>(args: &'n [ExprNode], config: &PassConfig) -> RewriteTarget<'n> {
    let reject = |r| RewriteTarget::NotATarget(Some(r));
    match args {
        [] => reject(Rejection::MissingArgument),
        [text] => {
            if !config.per_character_offsets {
                return reject(Rejection::FormDisabled(SpoofForm::PerCharacter));
            }
            match text.value.as_string_literal() {
                Some(text) => RewriteTarget::StringSpoof { text },
                None => reject(Rejection::NotAStringLiteral),
            }
        }
        [text, offset] => {
            if !config.shared_offset {
                return reject(Rejection::FormDisabled(SpoofForm::SharedOffset));
            }
            // Malformed two-argument calls are left alone without a report.
            let text = text.value.as_string_literal();
            let value = integer_literal(offset).filter(|v| v.abs() <= MAX_SHARED_OFFSET);
            match (text, value) {
                (Some(text), Some(value)) => RewriteTarget::OffsetSpoof {
                    text,
                    offset,
                    value,
                },
                _ => RewriteTarget::NotATarget(None),
            }
        }
        more => reject(Rejection::TooManyArguments(more.len())),
    }
}

/// Classify an enum declaration by name and configuration.
pub fn classify_enum<'n>(decl: &'n EnumDecl, config: &PassConfig) -> RewriteTarget<'n> {
    if config.spoof_enum && decl.name.ends_with(SPOOF_ENUM_SUFFIX) {
        RewriteTarget::SpoofEnum { name: &decl.name }
    } else {
        RewriteTarget::NotATarget(None)
    }
}

/// The member's name when it is a plain identifier, i.e. rewritable.
pub fn spoofable_member_name(member: &EnumMember) -> Option<&str> {
    match &member.name {
        MemberName::Identifier(name) => Some(name),
        MemberName::String(_) | MemberName::Computed(_) => None,
    }
}

/// Integral value of a numeric literal, optionally under a unary `-`/`+`.
pub fn integer_literal(expr: &ExprNode) -> Option<i64> {
    match &*expr.value {
        Expr::Number(number) => {
            let value = number.value;
            let integral = value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15;
            integral.then_some(value as i64)
        }
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => match &*operand.value {
            Expr::Number(_) => integer_literal(operand).map(|v| -v),
            _ => None,
        },
        Expr::Unary {
            op: UnaryOp::Plus,
            operand,
        } => match &*operand.value {
            Expr::Number(_) => integer_literal(operand),
            _ => None,
        },
        _ => None,
    }
}
