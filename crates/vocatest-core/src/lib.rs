//! vocatest-core: adaptive vocabulary test engine.
//!
//! This crate holds the question bank and its loader, the difficulty policy,
//! question selection, session state, scoring and results persistence. The
//! [`engine::VocabularyTest`] driver ties them together behind the three
//! operations a front end needs: start, answer and reset.

pub mod bank;
pub mod engine;
pub mod error;
pub mod history;
pub mod model;
pub mod parser;
pub mod policy;
pub mod report;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod traits;
