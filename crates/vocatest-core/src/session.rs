//! The mutable record of one test attempt.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bank::QuestionBank;
use crate::error::SessionError;
use crate::model::{
    AnswerRecord, Difficulty, Question, INITIAL_DIFFICULTY, MAX_QUESTIONS, NAME_MAX_CHARS,
    NAME_MIN_CHARS,
};
use crate::policy;
use crate::selector::select_question;

/// Trim a display name and check its length in characters.
///
/// # Errors
///
/// Returns `SessionError::InvalidName` if the trimmed name is not 2-20 characters.
pub fn validate_display_name(name: &str) -> Result<String, SessionError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        Ok(trimmed.to_string())
    } else {
        Err(SessionError::InvalidName { len })
    }
}

/// Build a test identifier like `VT_20261017093000_1a2b3c4d`.
///
/// The hash covers the start time to the nanosecond, so attempts begun within
/// the same second still get distinct ids.
#[must_use]
pub fn make_test_id(name: &str, at: DateTime<Utc>) -> String {
    let timestamp = at.format("%Y%m%d%H%M%S").to_string();
    let nanos = at.timestamp_nanos_opt().unwrap_or_else(|| at.timestamp());
    let digest = Sha256::digest(format!("{name}{nanos}").as_bytes());
    let hash = hex::encode(digest);
    format!("VT_{timestamp}_{}", &hash[..8])
}

/// State of an in-progress test.
///
/// `used_question_ids` and `answers` only ever grow, and no question id is
/// used twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    test_id: String,
    user_name: String,
    started_at: DateTime<Utc>,
    question_index: u32,
    current_difficulty: Difficulty,
    used_question_ids: BTreeSet<String>,
    answers: Vec<AnswerRecord>,
    first_two_correctness: Vec<bool>,
    in_flight: Option<Question>,
}

impl SessionState {
    /// Start a fresh session for `name`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidName` if the name fails validation.
    pub fn new(name: &str, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        let user_name = validate_display_name(name)?;
        let test_id = make_test_id(&user_name, started_at);
        Ok(Self {
            test_id,
            user_name,
            started_at,
            question_index: 1,
            current_difficulty: INITIAL_DIFFICULTY,
            used_question_ids: BTreeSet::new(),
            answers: Vec::new(),
            first_two_correctness: Vec::new(),
            in_flight: None,
        })
    }

    #[must_use]
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 1-based number of the question currently being administered.
    #[must_use]
    pub fn question_index(&self) -> u32 {
        self.question_index
    }

    #[must_use]
    pub fn current_difficulty(&self) -> Difficulty {
        self.current_difficulty
    }

    #[must_use]
    pub fn used_question_ids(&self) -> &BTreeSet<String> {
        &self.used_question_ids
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Correctness of questions 1 and 2, in order.
    #[must_use]
    pub fn first_two_correctness(&self) -> &[bool] {
        &self.first_two_correctness
    }

    /// The question shown but not yet answered, if any.
    #[must_use]
    pub fn question_in_flight(&self) -> Option<&Question> {
        self.in_flight.as_ref()
    }

    /// Returns `true` once every question of a full session has been answered.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.question_index > MAX_QUESTIONS
    }

    /// Difficulty the next selection will aim for.
    #[must_use]
    pub fn target_difficulty(&self) -> Difficulty {
        policy::target_difficulty(self.question_index, self.current_difficulty)
    }

    /// Select the next question into the in-flight buffer.
    ///
    /// Returns the question already in flight if there is one, and `None` when
    /// the bank has no unused question left.
    pub fn select_next<R: Rng + ?Sized>(
        &mut self,
        bank: &QuestionBank,
        rng: &mut R,
    ) -> Option<&Question> {
        if self.in_flight.is_none() {
            let target = self.target_difficulty();
            let question = select_question(bank, target, &mut self.used_question_ids, rng)?;
            tracing::debug!(
                "question {} -> {} ({}, target {target})",
                self.question_index,
                question.id,
                question.difficulty
            );
            self.in_flight = Some(question.clone());
        }
        self.in_flight.as_ref()
    }

    /// Record the answer to the in-flight question and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestionInFlight` if nothing is being asked, or
    /// `SessionError::UnknownOption` if `selected` is not one of its options.
    pub fn record_answer(&mut self, selected: &str) -> Result<AnswerRecord, SessionError> {
        let question = self
            .in_flight
            .as_ref()
            .ok_or(SessionError::NoQuestionInFlight)?;
        if !question.has_choice(selected) {
            return Err(SessionError::UnknownOption(selected.to_string()));
        }

        let correct_option = question.correct_option().to_string();
        let is_correct = selected == correct_option;
        let record = AnswerRecord {
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            selected_option: selected.to_string(),
            correct_option,
            is_correct,
            difficulty: question.difficulty,
            question_index: self.question_index,
        };

        self.answers.push(record.clone());
        if self.question_index <= 2 {
            self.first_two_correctness.push(is_correct);
        }
        let next = policy::next_difficulty(self, is_correct);
        tracing::debug!(
            "answered question {} ({}): correct={is_correct}, difficulty {} -> {next}",
            self.question_index,
            record.question_id,
            self.current_difficulty
        );
        self.current_difficulty = next;
        self.question_index += 1;
        self.in_flight = None;

        Ok(record)
    }
}
