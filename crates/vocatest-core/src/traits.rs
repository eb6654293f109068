//! Seams to the engine's external collaborators.
//!
//! A `QuestionSource` yields the questions a bank is built from, and a
//! `ResultsSink` receives one flat record per finished session.

use crate::history::ResultRecord;
use crate::parser::LoadOutcome;

// ---------------------------------------------------------------------------
// Question source
// ---------------------------------------------------------------------------

/// Anything that can produce questions for a bank.
///
/// Loading never fails outright: an unusable source yields an empty outcome
/// with `source_error` set.
pub trait QuestionSource {
    /// Human-readable description of where questions come from.
    fn describe(&self) -> String;

    /// Load every usable question, recording what had to be skipped.
    fn load(&self) -> LoadOutcome;
}

// ---------------------------------------------------------------------------
// Results sink
// ---------------------------------------------------------------------------

/// Durable storage for finished sessions.
///
/// Failures are reported to the caller, which logs them; they never affect the
/// in-memory results.
pub trait ResultsSink {
    fn record(&self, record: &ResultRecord) -> anyhow::Result<()>;
}

/// Sink that discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ResultsSink for NoopSink {
    fn record(&self, _: &ResultRecord) -> anyhow::Result<()> {
        Ok(())
    }
}
