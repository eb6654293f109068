//! Results persistence as JSON and the plain-text report.

use std::path::Path;

use anyhow::{Context, Result};

use crate::scoring::Results;

impl Results {
    /// Save the results as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        let results: Results =
            serde_json::from_str(&content).context("failed to parse results JSON")?;
        Ok(results)
    }
}

/// Render the downloadable plain-text report.
pub fn render_text_report(results: &Results) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();

    out.push_str("English Vocabulary Test Report\n");
    out.push_str(&format!("{rule}\n\n"));
    out.push_str(&format!("Test-taker: {}\n", results.user_name));
    out.push_str(&format!("Test ID:    {}\n", results.test_id));
    out.push_str(&format!(
        "Test date:  {}\n\n",
        results.started_at.format("%Y-%m-%d %H:%M:%S")
    ));

    out.push_str("Results\n");
    out.push_str(&format!("Questions:  {}\n", results.total_questions));
    out.push_str(&format!("Correct:    {}\n", results.correct_count));
    out.push_str(&format!("Accuracy:   {:.1}%\n", results.accuracy));
    out.push_str(&format!(
        "Score:      {}/{} ({:.1}%)\n",
        results.total_score, results.max_score, results.score_percentage
    ));
    out.push_str(&format!(
        "Final difficulty: {} {}\n\n",
        results.final_difficulty,
        results.final_difficulty.tier().name
    ));

    out.push_str("Vocabulary estimate\n");
    out.push_str(&format!("Total:      {} words\n", results.vocabulary_words()));
    out.push_str(&format!("Base:       {} words\n", results.base_vocabulary));
    out.push_str(&format!(
        "Increment:  {:.0} words\n\n",
        results.vocabulary_increment
    ));

    out.push_str("Mastery by level\n");
    for stats in &results.tier_stats {
        out.push_str(&format!(
            "{} {}: {:.1}% ({}/{})\n",
            stats.difficulty,
            stats.difficulty.tier().name,
            stats.accuracy(),
            stats.correct,
            stats.total
        ));
    }
    out.push('\n');

    out.push_str("Recommendation\n");
    out.push_str(&format!("{}\n\n", results.recommendation));
    out.push_str(&format!("{rule}\n"));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerRecord, Difficulty};
    use crate::scoring::{tier_stats, Recommendation};
    use chrono::{TimeZone, Utc};

    fn make_results() -> Results {
        let answers = vec![AnswerRecord {
            question_id: "L3_1".into(),
            question_text: "abandon".into(),
            selected_option: "give up".into(),
            correct_option: "give up".into(),
            is_correct: true,
            difficulty: Difficulty::new(3).unwrap(),
            question_index: 1,
        }];
        Results {
            test_id: "VT_20261017093000_deadbeef".into(),
            user_name: "Alice".into(),
            started_at: Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
            total_questions: 1,
            correct_count: 1,
            accuracy: 100.0,
            total_score: 3,
            max_score: 3,
            score_percentage: 100.0,
            base_vocabulary: 500,
            vocabulary_increment: 2500.0,
            total_vocabulary: 3000.0,
            tier_stats: tier_stats(&answers),
            final_difficulty: Difficulty::new(3).unwrap(),
            recommendation: Recommendation::ConsolidateCet,
            answers,
        }
    }

    #[test]
    fn json_roundtrip() {
        let results = make_results();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.json");

        results.save_json(&path).unwrap();
        let loaded = Results::load_json(&path).unwrap();

        assert_eq!(loaded, results);
    }

    #[test]
    fn text_report_contents() {
        let text = render_text_report(&make_results());

        assert!(text.contains("Test-taker: Alice"));
        assert!(text.contains("Accuracy:   100.0%"));
        assert!(text.contains("Total:      3000 words"));
        assert!(text.contains("Lv.3 CET-4/6: 100.0% (1/1)"));
        assert!(text.contains("Lv.5 GRE / TEM-8: 0.0% (0/0)"));
        assert!(text.contains("Consolidate your CET-4/6 vocabulary."));
    }

    #[test]
    fn text_report_layout() {
        let text = render_text_report(&make_results());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "English Vocabulary Test Report");
        assert_eq!(lines[1], "=".repeat(50));
        assert_eq!(lines[2], "");
        assert_eq!(lines[5], "Test date:  2026-10-17 09:30:00");
        assert!(lines.contains(&"Score:      3/3 (100.0%)"));
        assert!(text.ends_with(&format!("{}\n", "=".repeat(50))));
        assert_eq!(text.matches("Lv.").count(), 6);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Results::load_json(&dir.path().join("missing.json")).is_err());
    }
}
