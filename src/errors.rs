//! Error types for the notation engine
//!
//! Syntax errors in tuning config text abort the whole parse (no partial
//! config). Resolve errors indicate that a note could not be matched against
//! the compiled tables, or that the host handed us an inconsistent bar.

use thiserror::Error;

use crate::models::NoteId;

/// Failure to evaluate an arithmetic expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unbalanced parenthesis at {0}")]
    UnbalancedParen(usize),

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("result is not a finite number")]
    NotFinite,
}

/// Reason a tuning config line was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigErrorKind {
    #[error("not a tuning config")]
    NotATuningConfig,

    #[error("invalid reference note '{0}'")]
    InvalidReferenceNote(String),

    #[error("invalid reference frequency '{0}'")]
    InvalidFrequency(String),

    #[error("invalid nominal or equave tuning '{0}'")]
    InvalidNominals(String),

    #[error("equave size cannot be zero")]
    ZeroEquave,

    #[error("invalid symbols declaration '{0}'")]
    InvalidSymbols(String),

    #[error("invalid cents or ratio '{0}'")]
    InvalidCents(String),

    #[error("accidental chain has no increment: {0}")]
    MissingIncrement(String),

    #[error("accidental chain has more than one increment: {0}")]
    DuplicateIncrement(String),

    #[error("invalid {directive} declaration: {reason}")]
    InvalidDirective { directive: &'static str, reason: String },

    #[error("expected aux(...), lig(...), sec(), override(), independent(), explicit() or nobold(), got '{0}'")]
    UnexpectedLine(String),

    #[error("invalid ligature entry: {0}")]
    InvalidLigature(String),

    #[error("invalid secondary accidental: {0}")]
    InvalidSecondary(String),

    #[error("invalid override: {0}")]
    InvalidOverride(String),

    #[error("invalid independent symbol group: {0}")]
    InvalidSymbolGroup(String),
}

/// Tuning config syntax error, tagged with its 1-based line number
#[derive(Debug, Clone, PartialEq, Error)]
#[error("tuning config line {line}: {kind}")]
pub struct ConfigError {
    pub line: usize,
    pub kind: ConfigErrorKind,
}

impl ConfigError {
    pub fn new(line: usize, kind: ConfigErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Failure to resolve a note against a compiled tuning config
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The matched primary symbols do not key any compiled spelling.
    /// The config's ligature/secondary declarations cannot reconstruct this
    /// combination.
    #[error("no XenNote for hash '{hash}' (trace: {trace})")]
    XenNoteNotFound { hash: String, trace: String },

    #[error("tick {tick} is outside the bar {start}..{end:?}")]
    TickOutsideBar { tick: i64, start: i64, end: Option<i64> },

    #[error("note {0} not found in bar")]
    NoteNotInBar(NoteId),
}
