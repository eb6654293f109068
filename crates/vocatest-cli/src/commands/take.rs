//! The `vocatest take` command.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vocatest_core::engine::{CompletedTest, VocabularyTest};
use vocatest_core::error::SessionError;
use vocatest_core::history::JsonlResultsSink;
use vocatest_core::model::{option_index_from_letter, option_letter, MAX_QUESTIONS, TIERS};
use vocatest_core::parser::TomlQuestionSource;
use vocatest_core::report::render_text_report;
use vocatest_core::session::validate_display_name;
use vocatest_core::traits::QuestionSource;

use crate::config::load_config_from;

/// Flags of the `take` subcommand.
pub struct TakeOptions {
    pub bank: Option<PathBuf>,
    pub name: Option<String>,
    pub seed: Option<u64>,
    pub results: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Where finished tests are written besides the results file.
struct Outputs<'a> {
    json: Option<&'a Path>,
    report: Option<&'a Path>,
}

/// One line of input from the test-taker.
enum Reply {
    Choice(usize),
    Quit,
    Invalid,
}

pub fn execute(options: TakeOptions) -> Result<()> {
    let config = load_config_from(options.config.as_deref())?;
    let bank_path = options.bank.unwrap_or(config.question_bank);
    let results_path = options.results.unwrap_or(config.results_file);
    let seed = options.seed.or(config.seed);

    let source = TomlQuestionSource::new(&bank_path);
    let outcome = source.load();
    if let Some(err) = &outcome.source_error {
        return Err(err.clone()).context("cannot start a test");
    }
    anyhow::ensure!(
        !outcome.is_empty(),
        "no usable questions in {}",
        source.describe()
    );
    if !outcome.skipped_tiers.is_empty() || !outcome.skipped_rows.is_empty() {
        tracing::warn!(
            "{} tier(s) and {} row(s) skipped while loading {}",
            outcome.skipped_tiers.len(),
            outcome.skipped_rows.len(),
            source.describe()
        );
    }

    let bank = Arc::new(outcome.into_bank());
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut test = VocabularyTest::new(bank, rng).with_sink(JsonlResultsSink::new(&results_path));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let outputs = Outputs {
        json: options.output.as_deref(),
        report: options.report.as_deref(),
    };
    run(
        &mut test,
        &mut stdin.lock(),
        &mut stdout.lock(),
        options.name,
        &outputs,
    )?;

    Ok(())
}

fn run<R: Rng, I: BufRead, W: Write>(
    test: &mut VocabularyTest<R>,
    input: &mut I,
    out: &mut W,
    name: Option<String>,
    outputs: &Outputs<'_>,
) -> Result<()> {
    print_welcome(out)?;

    let name = match name {
        Some(name) => name,
        None => match prompt_name(input, out)? {
            Some(name) => name,
            None => {
                writeln!(out, "\nNo name given, exiting.")?;
                return Ok(());
            }
        },
    };
    test.start_test(&name)?;

    loop {
        if !administer(test, input, out)? {
            test.reset();
            writeln!(out, "\nTest abandoned, results discarded.")?;
            return Ok(());
        }

        let completed = test
            .completed()
            .context("test ended without results")?;
        print_results(out, completed)?;
        save_outputs(completed, outputs)?;

        write!(out, "\nEnter r to retake the test, anything else to exit: ")?;
        out.flush()?;
        match read_line(input)? {
            Some(line) if line.trim().eq_ignore_ascii_case("r") => {
                test.retake()?;
                writeln!(out)?;
            }
            _ => return Ok(()),
        }
    }
}

fn print_welcome<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "English Vocabulary Adaptive Test")?;
    writeln!(out)?;
    writeln!(
        out,
        "{MAX_QUESTIONS} questions. The difficulty adapts to your answers."
    )?;
    writeln!(out, "Answer with a letter (A-D) or a number (1-4); q quits.")?;
    writeln!(out)?;
    for tier in &TIERS {
        writeln!(out, "  Lv.{} {}: {}", tier.level, tier.name, tier.description)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Ask until a valid name is entered. `None` on end of input.
fn prompt_name<I: BufRead, W: Write>(input: &mut I, out: &mut W) -> Result<Option<String>> {
    loop {
        write!(out, "Your name: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match validate_display_name(&line) {
            Ok(name) => return Ok(Some(name)),
            Err(e) => writeln!(out, "{e}")?,
        }
    }
}

/// Ask questions until the test finishes. Returns `false` if the test-taker quit.
fn administer<R: Rng, I: BufRead, W: Write>(
    test: &mut VocabularyTest<R>,
    input: &mut I,
    out: &mut W,
) -> Result<bool> {
    loop {
        let Some(question) = test.current_question().cloned() else {
            return Ok(true);
        };
        let number = test.session().map_or(0, |s| s.question_index());

        writeln!(out, "Question {number}/{MAX_QUESTIONS}")?;
        writeln!(out, "  {}", question.text)?;
        for (idx, option) in question.choices() {
            writeln!(out, "    {}. {option}", option_letter(idx))?;
        }

        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                return Ok(false);
            };
            match parse_reply(&line) {
                Reply::Quit => return Ok(false),
                Reply::Invalid => writeln!(out, "Please answer A-D or 1-4 (q to quit).")?,
                Reply::Choice(index) => match test.submit_choice(index) {
                    Ok(outcome) => {
                        tracing::debug!(
                            "{} answered, correct={}",
                            outcome.record.question_id,
                            outcome.record.is_correct
                        );
                        writeln!(out)?;
                        break;
                    }
                    Err(SessionError::OptionOutOfRange(_)) => {
                        writeln!(out, "That option is not available for this question.")?;
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }
    }
}

fn parse_reply(line: &str) -> Reply {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Reply::Quit;
    }
    if let Some(index) = option_index_from_letter(line) {
        return Reply::Choice(index);
    }
    match line.parse::<usize>() {
        Ok(n @ 1..=4) => Reply::Choice(n - 1),
        _ => Reply::Invalid,
    }
}

/// Read one line without its terminator. `None` at end of input.
fn read_line<I: BufRead>(input: &mut I) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).context("failed to read input")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn print_results<W: Write>(out: &mut W, completed: &CompletedTest) -> Result<()> {
    let results = &completed.results;

    writeln!(out, "Test complete, {}.", results.user_name)?;
    writeln!(out, "Test ID: {}", results.test_id)?;
    writeln!(out)?;

    let mut summary = Table::new();
    summary.set_header(vec!["Vocabulary estimate", "Accuracy", "Score", "Final difficulty"]);
    summary.add_row(vec![
        Cell::new(format!("{} words", results.vocabulary_words())),
        Cell::new(format!(
            "{:.1}% ({}/{})",
            results.accuracy, results.correct_count, results.total_questions
        )),
        Cell::new(format!(
            "{}/{} ({:.1}%)",
            results.total_score, results.max_score, results.score_percentage
        )),
        Cell::new(format!(
            "{} {}",
            results.final_difficulty,
            results.final_difficulty.tier().name
        )),
    ]);
    writeln!(out, "{summary}")?;

    let mut mastery = Table::new();
    mastery.set_header(vec!["Level", "Name", "Answered", "Correct", "Mastery"]);
    for stats in &results.tier_stats {
        mastery.add_row(vec![
            Cell::new(stats.difficulty),
            Cell::new(stats.difficulty.tier().name),
            Cell::new(stats.total),
            Cell::new(stats.correct),
            Cell::new(format!("{:.1}%", stats.accuracy())),
        ]);
    }
    writeln!(out, "\nMastery by level")?;
    writeln!(out, "{mastery}")?;

    let mut answers = Table::new();
    answers.set_header(vec!["#", "Level", "Result", "Your answer", "Correct answer"]);
    for answer in &results.answers {
        answers.add_row(vec![
            Cell::new(answer.question_index),
            Cell::new(answer.difficulty),
            Cell::new(if answer.is_correct { "correct" } else { "wrong" }),
            Cell::new(truncate(&answer.selected_option, 30)),
            Cell::new(truncate(&answer.correct_option, 30)),
        ]);
    }
    writeln!(out, "\nAnswers")?;
    writeln!(out, "{answers}")?;

    writeln!(out, "\nRecommendation: {}", results.recommendation)?;
    if !completed.saved {
        writeln!(out, "Warning: the result could not be added to the history file.")?;
    }
    Ok(())
}

fn save_outputs(completed: &CompletedTest, outputs: &Outputs<'_>) -> Result<()> {
    if let Some(path) = outputs.json {
        completed.results.save_json(path)?;
        eprintln!("Results saved to: {}", path.display());
    }
    if let Some(path) = outputs.report {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, render_text_report(&completed.results))
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}
