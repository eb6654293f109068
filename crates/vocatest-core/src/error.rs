//! Error types for the vocatest engine.
//!
//! Loading problems are localized (a skipped row or tier) and reported as data
//! on the load outcome rather than returned as failures. Session errors are
//! returned from the state-machine operations and never change state.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::{NAME_MAX_CHARS, NAME_MIN_CHARS};

/// Why the question source as a whole could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The source file does not exist.
    #[error("question source not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The source exists but could not be read.
    #[error("failed to read question source {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    /// The source is not valid TOML.
    #[error("failed to parse question source: {0}")]
    Parse(String),
}

/// Why a whole tier was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    #[error("tier sheet is missing")]
    Missing,

    #[error("tier sheet is not an array of rows")]
    NotAnArray,

    #[error("tier sheet lacks required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Why a single row was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row is not a table")]
    NotATable,

    #[error("question text is empty")]
    EmptyQuestion,

    #[error("cell '{0}' is not a scalar value")]
    NonScalarCell(String),

    #[error("only {found} non-empty option(s), at least 2 required")]
    TooFewOptions { found: usize },
}

/// Lifecycle phase of a test, used in transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Welcome,
    Testing,
    Results,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Welcome => write!(f, "welcome"),
            PhaseKind::Testing => write!(f, "testing"),
            PhaseKind::Results => write!(f, "results"),
        }
    }
}

/// Errors returned by session operations. State is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(
        "display name must be {}-{} characters after trimming, got {len}",
        NAME_MIN_CHARS,
        NAME_MAX_CHARS
    )]
    InvalidName { len: usize },

    #[error("cannot {action} while in the {phase} phase")]
    InvalidTransition {
        phase: PhaseKind,
        action: &'static str,
    },

    #[error("the question bank is empty")]
    EmptyBank,

    #[error("no test in progress")]
    NotTesting,

    #[error("no question is currently being administered")]
    NoQuestionInFlight,

    #[error("'{0}' is not one of the current question's options")]
    UnknownOption(String),

    #[error("option {0} is not available for the current question")]
    OptionOutOfRange(usize),
}
