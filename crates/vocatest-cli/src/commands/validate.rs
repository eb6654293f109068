//! The `vocatest validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use vocatest_core::model::Difficulty;
use vocatest_core::parser::{load_question_bank, validate_bank};

use crate::config::load_config_from;

pub fn execute(bank: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let bank_path = match bank {
        Some(path) => path,
        None => load_config_from(config.as_deref())?.question_bank,
    };

    let outcome = load_question_bank(&bank_path);
    if let Some(err) = &outcome.source_error {
        return Err(err.clone()).context("validation failed");
    }

    println!(
        "Question bank: {} ({} questions)",
        bank_path.display(),
        outcome.questions.len()
    );
    for difficulty in Difficulty::ALL {
        let count = outcome
            .questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .count();
        println!("  {difficulty} {}: {count}", difficulty.tier().name);
    }

    let warnings = validate_bank(&outcome);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
