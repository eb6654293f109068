//! Flat per-session records and the JSON Lines results file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Difficulty;
use crate::scoring::Results;
use crate::traits::ResultsSink;

/// One finished session, flattened for durable storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub test_id: String,
    pub user_name: String,
    /// When the test was started, as on the text report.
    pub test_date: DateTime<Utc>,
    pub total_questions: u32,
    pub correct_count: u32,
    /// Percentage.
    pub accuracy: f64,
    pub total_score: u32,
    pub max_score: u32,
    pub total_vocabulary: u32,
    pub final_difficulty: u8,
    pub recommendation: String,
    pub level1_mastery: f64,
    pub level2_mastery: f64,
    pub level3_mastery: f64,
    pub level4_mastery: f64,
    pub level5_mastery: f64,
}

impl ResultRecord {
    #[must_use]
    pub fn from_results(results: &Results) -> Self {
        let mastery = |level: u8| {
            Difficulty::new(level)
                .and_then(|d| results.tier(d))
                .map_or(0.0, |s| s.accuracy())
        };
        Self {
            test_id: results.test_id.clone(),
            user_name: results.user_name.clone(),
            test_date: results.started_at,
            total_questions: results.total_questions,
            correct_count: results.correct_count,
            accuracy: results.accuracy,
            total_score: results.total_score,
            max_score: results.max_score,
            total_vocabulary: results.vocabulary_words(),
            final_difficulty: results.final_difficulty.level(),
            recommendation: results.recommendation.message().to_string(),
            level1_mastery: mastery(1),
            level2_mastery: mastery(2),
            level3_mastery: mastery(3),
            level4_mastery: mastery(4),
            level5_mastery: mastery(5),
        }
    }

    /// Mastery percentages, lowest tier first.
    #[must_use]
    pub fn mastery(&self) -> [f64; 5] {
        [
            self.level1_mastery,
            self.level2_mastery,
            self.level3_mastery,
            self.level4_mastery,
            self.level5_mastery,
        ]
    }
}

/// Appends one JSON object per line to a results file.
#[derive(Debug, Clone)]
pub struct JsonlResultsSink {
    path: PathBuf,
}

impl JsonlResultsSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultsSink for JsonlResultsSink {
    fn record(&self, record: &ResultRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("failed to serialize result record")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open results file {}", self.path.display()))?;
        writeln!(file, "{line}")
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        Ok(())
    }
}

/// Read every record from a JSON Lines results file.
///
/// A missing file is an empty history; malformed lines are skipped.
pub fn load_history(path: &Path) -> Result<Vec<ResultRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read results file {}", path.display()))?;

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ResultRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("skipping {} line {}: {}", path.display(), idx + 1, e);
            }
        }
    }
    Ok(records)
}
