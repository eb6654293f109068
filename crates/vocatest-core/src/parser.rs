//! TOML question-bank loader.
//!
//! A bank file holds one array of rows per tier sheet (`[[primary]]`,
//! `[[high_school]]`, `[[cet]]`, `[[ielts_toefl]]`, `[[gre]]`). Each tier and
//! each row is loaded independently: a malformed tier or row is skipped and
//! recorded on the `LoadOutcome`, and loading carries on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::bank::QuestionBank;
use crate::error::{RowError, SourceError, TierError};
use crate::model::{option_index_from_letter, option_letter, Difficulty, Question};
use crate::traits::QuestionSource;

/// Columns every tier sheet must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["question", "correct_option", "option_a", "option_b"];

const OPTION_COLUMNS: [&str; 4] = ["option_a", "option_b", "option_c", "option_d"];

/// A row that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub difficulty: Difficulty,
    /// 1-based row number within the tier sheet.
    pub row: usize,
    pub reason: RowError,
}

/// A tier sheet that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTier {
    pub difficulty: Difficulty,
    pub reason: TierError,
}

/// Partial-success result of loading a question source.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub questions: Vec<Question>,
    pub skipped_rows: Vec<SkippedRow>,
    pub skipped_tiers: Vec<SkippedTier>,
    /// Ids of questions whose answer letter was unrecognized and defaulted to `A`.
    pub defaulted_answers: Vec<String>,
    /// Set when the source as a whole was unusable.
    pub source_error: Option<SourceError>,
}

impl LoadOutcome {
    fn unavailable(error: SourceError) -> Self {
        Self {
            source_error: Some(error),
            ..Self::default()
        }
    }

    /// Returns `true` when no question could be loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn into_bank(self) -> QuestionBank {
        QuestionBank::from_questions(self.questions)
    }
}

/// A question bank stored as a TOML file.
#[derive(Debug, Clone)]
pub struct TomlQuestionSource {
    path: PathBuf,
}

impl TomlQuestionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuestionSource for TomlQuestionSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> LoadOutcome {
        load_question_bank(&self.path)
    }
}

/// Load a question bank file. Never fails: problems are recorded on the outcome.
pub fn load_question_bank(path: &Path) -> LoadOutcome {
    if !path.exists() {
        tracing::warn!("question source not found: {}", path.display());
        return LoadOutcome::unavailable(SourceError::NotFound(path.to_path_buf()));
    }

    match std::fs::read_to_string(path) {
        Ok(content) => load_question_bank_str(&content),
        Err(e) => {
            tracing::warn!("failed to read question source {}: {e}", path.display());
            LoadOutcome::unavailable(SourceError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }
}

/// Load a question bank from TOML text (useful for testing).
pub fn load_question_bank_str(content: &str) -> LoadOutcome {
    let table: toml::Table = match toml::from_str(content) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!("failed to parse question source: {e}");
            return LoadOutcome::unavailable(SourceError::Parse(e.to_string()));
        }
    };

    let mut outcome = LoadOutcome::default();

    for difficulty in Difficulty::ALL {
        let sheet = difficulty.tier().sheet;
        let rows = match tier_rows(&table, sheet) {
            Ok(rows) => rows,
            Err(reason) => {
                tracing::warn!("skipping tier {difficulty} ({sheet}): {reason}");
                outcome.skipped_tiers.push(SkippedTier { difficulty, reason });
                continue;
            }
        };

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;
            match parse_row(difficulty, row_number, row) {
                Ok((question, letter_recognized)) => {
                    if !letter_recognized {
                        outcome.defaulted_answers.push(question.id.clone());
                    }
                    outcome.questions.push(question);
                }
                Err(reason) => {
                    tracing::debug!("skipping {sheet} row {row_number}: {reason}");
                    outcome.skipped_rows.push(SkippedRow {
                        difficulty,
                        row: row_number,
                        reason,
                    });
                }
            }
        }
    }

    outcome
}

/// Rows of one tier sheet, checked for the required columns.
fn tier_rows<'a>(table: &'a toml::Table, sheet: &str) -> Result<&'a Vec<toml::Value>, TierError> {
    let value = table.get(sheet).ok_or(TierError::Missing)?;
    let rows = value.as_array().ok_or(TierError::NotAnArray)?;

    let columns: HashSet<&str> = rows
        .iter()
        .filter_map(toml::Value::as_table)
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !columns.contains(*col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(TierError::MissingColumns(missing));
    }

    Ok(rows)
}

/// Parse one row. The flag is `false` when the answer letter defaulted to `A`.
fn parse_row(
    difficulty: Difficulty,
    row_number: usize,
    row: &toml::Value,
) -> Result<(Question, bool), RowError> {
    let row = row.as_table().ok_or(RowError::NotATable)?;

    let text = cell_text(row, "question")?;
    if text.is_empty() {
        return Err(RowError::EmptyQuestion);
    }

    let letter = cell_text(row, "correct_option")?;
    let recognized = option_index_from_letter(&letter);

    let options = OPTION_COLUMNS
        .iter()
        .map(|col| cell_text(row, col))
        .collect::<Result<Vec<_>, _>>()?;
    let found = options.iter().filter(|o| !o.is_empty()).count();
    if found < 2 {
        return Err(RowError::TooFewOptions { found });
    }

    let question = Question {
        id: format!("L{}_{}", difficulty.level(), row_number),
        text,
        options,
        correct_index: recognized.unwrap_or(0),
        difficulty,
    };
    Ok((question, recognized.is_some()))
}

/// Trimmed text of a scalar cell; an absent cell is an empty placeholder.
fn cell_text(row: &toml::Table, column: &str) -> Result<String, RowError> {
    let text = match row.get(column) {
        None => String::new(),
        Some(toml::Value::String(s)) => s.trim().to_string(),
        Some(toml::Value::Integer(i)) => i.to_string(),
        Some(toml::Value::Float(f)) => f.to_string(),
        Some(toml::Value::Boolean(b)) => b.to_string(),
        Some(toml::Value::Datetime(d)) => d.to_string(),
        Some(toml::Value::Array(_) | toml::Value::Table(_)) => {
            return Err(RowError::NonScalarCell(column.to_string()));
        }
    };
    Ok(text)
}

/// A warning from question-bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a load outcome for data-quality issues worth surfacing.
pub fn validate_bank(outcome: &LoadOutcome) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(err) = &outcome.source_error {
        warnings.push(ValidationWarning {
            question_id: None,
            message: err.to_string(),
        });
        return warnings;
    }

    for skipped in &outcome.skipped_tiers {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "tier {} ({}) skipped: {}",
                skipped.difficulty,
                skipped.difficulty.tier().sheet,
                skipped.reason
            ),
        });
    }

    for skipped in &outcome.skipped_rows {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "{} row {} skipped: {}",
                skipped.difficulty.tier().sheet,
                skipped.row,
                skipped.reason
            ),
        });
    }

    for id in &outcome.defaulted_answers {
        warnings.push(ValidationWarning {
            question_id: Some(id.clone()),
            message: "unrecognized correct_option, defaulted to A".into(),
        });
    }

    for question in &outcome.questions {
        if question.correct_option().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!(
                    "correct_option {} points at an empty option",
                    option_letter(question.correct_index)
                ),
            });
        }
    }

    // Empty tiers force selection to fall back to other tiers
    let mut counts = [0usize; 5];
    for question in &outcome.questions {
        counts[question.difficulty.index()] += 1;
    }
    for difficulty in Difficulty::ALL {
        if counts[difficulty.index()] == 0 {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("tier {difficulty} has no questions"),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[[primary]]
question = "apple"
correct_option = "a"
option_a = "a kind of fruit"
option_b = "a vehicle"
option_c = "a color"
option_d = "a tool"

[[primary]]
question = "   "
correct_option = "B"
option_a = "x"
option_b = "y"

[[cet]]
question = "abandon"
correct_option = "C"
option_a = "keep"
option_b = "collect"
option_c = "give up"

[[cet]]
question = "ambiguous"
correct_option = "Z"
option_a = "unclear"
option_b = "obvious"

[[gre]]
question = "obdurate"
correct_option = "B"
option_a = "flexible"
option_b = ""
"#;

    #[test]
    fn parse_valid_rows() {
        let outcome = load_question_bank_str(VALID_TOML);
        assert!(outcome.source_error.is_none());

        let ids: Vec<_> = outcome.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["L1_1", "L3_1", "L3_2"]);

        let abandon = &outcome.questions[1];
        assert_eq!(abandon.correct_index, 2);
        assert_eq!(abandon.correct_option(), "give up");
        assert_eq!(abandon.options.len(), 4);
        assert_eq!(abandon.options[3], "");
    }

    #[test]
    fn unrecognized_letter_defaults_to_first_option() {
        let outcome = load_question_bank_str(VALID_TOML);
        let ambiguous = &outcome.questions[2];
        assert_eq!(ambiguous.correct_index, 0);
        assert_eq!(outcome.defaulted_answers, vec!["L3_2".to_string()]);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let outcome = load_question_bank_str(VALID_TOML);
        assert_eq!(
            outcome.skipped_rows,
            vec![
                SkippedRow {
                    difficulty: Difficulty::MIN,
                    row: 2,
                    reason: RowError::EmptyQuestion,
                },
                SkippedRow {
                    difficulty: Difficulty::MAX,
                    row: 1,
                    reason: RowError::TooFewOptions { found: 1 },
                },
            ]
        );
    }

    #[test]
    fn missing_tiers_are_recorded() {
        let outcome = load_question_bank_str(VALID_TOML);
        let skipped: Vec<_> = outcome
            .skipped_tiers
            .iter()
            .map(|t| (t.difficulty.level(), t.reason.clone()))
            .collect();
        assert_eq!(
            skipped,
            vec![(2, TierError::Missing), (4, TierError::Missing)]
        );
    }

    #[test]
    fn tier_without_required_columns_is_skipped() {
        let toml = r#"
[[primary]]
question = "apple"
option_a = "fruit"
option_b = "car"

[[high_school]]
question = "bridge"
correct_option = "A"
option_a = "a structure over water"
option_b = "a kind of bird"
"#;
        let outcome = load_question_bank_str(toml);
        assert_eq!(outcome.questions.len(), 1);
        assert_eq!(outcome.questions[0].id, "L2_1");
        assert_eq!(
            outcome.skipped_tiers[0],
            SkippedTier {
                difficulty: Difficulty::MIN,
                reason: TierError::MissingColumns(vec!["correct_option".into()]),
            }
        );
    }

    #[test]
    fn tier_that_is_not_an_array() {
        let outcome = load_question_bank_str("primary = \"oops\"\n");
        assert_eq!(outcome.skipped_tiers[0].reason, TierError::NotAnArray);
        assert!(outcome.is_empty());
    }

    #[test]
    fn scalar_cells_are_stringified() {
        let toml = r#"
[[primary]]
question = "How many legs does a spider have?"
correct_option = "b"
option_a = 6
option_b = 8
"#;
        let outcome = load_question_bank_str(toml);
        assert_eq!(outcome.questions[0].options[..2], ["6".to_string(), "8".to_string()]);
        assert_eq!(outcome.questions[0].correct_option(), "8");
    }

    #[test]
    fn non_scalar_cell_skips_row() {
        let toml = r#"
[[primary]]
question = "apple"
correct_option = "A"
option_a = ["fruit"]
option_b = "car"
"#;
        let outcome = load_question_bank_str(toml);
        assert!(outcome.is_empty());
        assert_eq!(
            outcome.skipped_rows[0].reason,
            RowError::NonScalarCell("option_a".into())
        );
    }

    #[test]
    fn parse_malformed_toml() {
        let outcome = load_question_bank_str("this is not [valid toml }{");
        assert!(outcome.is_empty());
        assert!(matches!(outcome.source_error, Some(SourceError::Parse(_))));
    }

    #[test]
    fn missing_file_is_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let outcome = TomlQuestionSource::new(&path).load();
        assert!(outcome.is_empty());
        assert_eq!(outcome.source_error, Some(SourceError::NotFound(path)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.toml");
        std::fs::write(&path, VALID_TOML).unwrap();

        let bank = TomlQuestionSource::new(&path).load().into_bank();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.tier_counts(), [1, 0, 2, 0, 0]);
    }

    #[test]
    fn validate_reports_quality_issues() {
        let outcome = load_question_bank_str(VALID_TOML);
        let warnings = validate_bank(&outcome);

        assert!(warnings.iter().any(|w| w.message.contains("ielts_toefl")));
        assert!(warnings.iter().any(|w| w.message.contains("row 2 skipped")));
        assert!(warnings
            .iter()
            .any(|w| w.question_id.as_deref() == Some("L3_2")));
        assert!(warnings.iter().any(|w| w.message == "tier Lv.5 has no questions"));
    }

    #[test]
    fn validate_flags_answer_pointing_at_placeholder() {
        let toml = r#"
[[primary]]
question = "apple"
correct_option = "D"
option_a = "fruit"
option_b = "car"
"#;
        let warnings = validate_bank(&load_question_bank_str(toml));
        assert!(warnings.iter().any(|w| w.question_id.as_deref() == Some("L1_1")
            && w.message == "correct_option D points at an empty option"));
    }
}
