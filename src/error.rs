//! Error types for grammar loading and documentation-model construction.

use crate::grammar::RuleKind;
use thiserror::Error;

/// A rule documentation node could not be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("rule `{rule}` is a {found}, expected a {expected}")]
    KindMismatch {
        rule: String,
        expected: &'static str,
        found: RuleKind,
    },

    #[error("rule `{rule}` does not belong to grammar `{grammar}`")]
    ForeignRule { rule: String, grammar: String },

    #[error("rule `{rule}` is documented more than once")]
    DuplicateRule { rule: String },
}

/// A grammar file could not be loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {kind}")]
pub struct LoadError {
    pub kind: LoadErrorKind,
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadErrorKind {
    #[error("unrecognized input")]
    InvalidToken,

    #[error("unexpected {found}, expected {expected}")]
    Unexpected { found: String, expected: String },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("missing `grammar` declaration")]
    MissingGrammar,
}

impl LoadError {
    /// Build an error positioned at byte `offset` of `source`.
    pub fn at(kind: LoadErrorKind, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self { kind, line, column }
    }
}
