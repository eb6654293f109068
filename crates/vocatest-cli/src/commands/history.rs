//! The `vocatest history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use vocatest_core::history::{load_history, ResultRecord};

use crate::config::load_config_from;

pub fn execute(
    results: Option<PathBuf>,
    limit: Option<usize>,
    json: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let results_path = match results {
        Some(path) => path,
        None => load_config_from(config.as_deref())?.results_file,
    };

    let mut records = load_history(&results_path)?;
    // Most recent first
    records.sort_by(|a, b| b.test_date.cmp(&a.test_date));
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No results recorded in {}.", results_path.display());
        return Ok(());
    }

    print_table(&records);
    Ok(())
}

fn print_table(records: &[ResultRecord]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Name",
        "Test ID",
        "Questions",
        "Accuracy",
        "Score",
        "Vocabulary",
        "Final level",
    ]);

    for record in records {
        table.add_row(vec![
            Cell::new(record.test_date.format("%Y-%m-%d %H:%M")),
            Cell::new(&record.user_name),
            Cell::new(&record.test_id),
            Cell::new(record.total_questions),
            Cell::new(format!("{:.1}%", record.accuracy)),
            Cell::new(format!("{}/{}", record.total_score, record.max_score)),
            Cell::new(record.total_vocabulary),
            Cell::new(format!("Lv.{}", record.final_difficulty)),
        ]);
    }

    println!("{table}");
}
