//! Results scoring: accuracy, weighted score, vocabulary estimate and
//! per-tier mastery.
//!
//! Scoring is a pure function of a session. Tiers that were never reached
//! count as zero mastery and contribute nothing to the vocabulary estimate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AnswerRecord, Difficulty, BASE_VOCABULARY};
use crate::session::SessionState;

/// Vocabulary thresholds separating the recommendation bands.
pub const RECOMMENDATION_THRESHOLDS: [f64; 4] = [2500.0, 5000.0, 8000.0, 12000.0];

/// Study advice derived from the vocabulary estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Below 2500 words.
    Foundations,
    /// 2500 to 5000 words.
    ConsolidateCet,
    /// 5000 to 8000 words.
    IeltsToefl,
    /// 8000 to 12000 words.
    Gre,
    /// 12000 words or more.
    ReadWidely,
}

impl Recommendation {
    /// Step function of the total vocabulary estimate.
    #[must_use]
    pub fn for_vocabulary(total_vocabulary: f64) -> Self {
        let [foundations, cet, ielts, gre] = RECOMMENDATION_THRESHOLDS;
        if total_vocabulary < foundations {
            Recommendation::Foundations
        } else if total_vocabulary < cet {
            Recommendation::ConsolidateCet
        } else if total_vocabulary < ielts {
            Recommendation::IeltsToefl
        } else if total_vocabulary < gre {
            Recommendation::Gre
        } else {
            Recommendation::ReadWidely
        }
    }

    /// The advisory text shown to the test-taker.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::Foundations => {
                "Start with a systematic study of foundational vocabulary."
            }
            Recommendation::ConsolidateCet => "Consolidate your CET-4/6 vocabulary.",
            Recommendation::IeltsToefl => "Move on to IELTS and TOEFL vocabulary.",
            Recommendation::Gre => "Study GRE and specialist vocabulary.",
            Recommendation::ReadWidely => {
                "Your vocabulary is very rich; keep expanding it through original books and academic literature."
            }
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Answer statistics for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    pub difficulty: Difficulty,
    pub total: u32,
    pub correct: u32,
    /// Fraction correct in `0..=1`; 0 when the tier was never asked.
    pub mastery: f64,
}

impl TierStats {
    /// Mastery as a percentage.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.mastery * 100.0
    }
}

/// The scored outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    pub test_id: String,
    pub user_name: String,
    pub started_at: DateTime<Utc>,

    pub total_questions: u32,
    pub correct_count: u32,
    /// Percentage of answers that were correct.
    pub accuracy: f64,

    /// Sum of the tier weights of correct answers.
    pub total_score: u32,
    /// Sum of the tier weights of all answers.
    pub max_score: u32,
    pub score_percentage: f64,

    pub base_vocabulary: u32,
    pub vocabulary_increment: f64,
    pub total_vocabulary: f64,

    /// One entry per tier, lowest first.
    pub tier_stats: Vec<TierStats>,
    /// Difficulty a further question would have been asked at.
    pub final_difficulty: Difficulty,
    pub recommendation: Recommendation,

    pub answers: Vec<AnswerRecord>,
}

impl Results {
    /// Statistics for one tier.
    #[must_use]
    pub fn tier(&self, difficulty: Difficulty) -> Option<&TierStats> {
        self.tier_stats.iter().find(|s| s.difficulty == difficulty)
    }

    /// Vocabulary estimate as a whole number of words.
    #[must_use]
    pub fn vocabulary_words(&self) -> u32 {
        // Estimates are bounded by the tier increments, far below u32::MAX.
        self.total_vocabulary.max(0.0) as u32
    }
}

/// Percentage of `part` in `whole`, or 0 when `whole` is 0.
fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

/// Per-tier statistics over a list of answers.
#[must_use]
pub fn tier_stats(answers: &[AnswerRecord]) -> Vec<TierStats> {
    Difficulty::ALL
        .into_iter()
        .map(|difficulty| {
            let (total, correct) = answers
                .iter()
                .filter(|a| a.difficulty == difficulty)
                .fold((0u32, 0u32), |(total, correct), a| {
                    (total + 1, correct + u32::from(a.is_correct))
                });
            let mastery = if total > 0 {
                f64::from(correct) / f64::from(total)
            } else {
                0.0
            };
            TierStats {
                difficulty,
                total,
                correct,
                mastery,
            }
        })
        .collect()
}

/// Score a session. Pure: the same session always yields identical results.
#[must_use]
pub fn score(session: &SessionState) -> Results {
    let answers = session.answers();

    let total_questions = answers.len() as u32;
    let correct_count = answers.iter().filter(|a| a.is_correct).count() as u32;
    let accuracy = percentage(correct_count, total_questions);

    let tier_stats = tier_stats(answers);
    let vocabulary_increment: f64 = tier_stats
        .iter()
        .map(|s| f64::from(s.difficulty.tier().increment) * s.mastery)
        .sum();
    let total_vocabulary = f64::from(BASE_VOCABULARY) + vocabulary_increment;

    let (total_score, max_score) = answers.iter().fold((0u32, 0u32), |(score, max), a| {
        let weight = a.difficulty.tier().weight;
        (score + if a.is_correct { weight } else { 0 }, max + weight)
    });
    let score_percentage = percentage(total_score, max_score);

    Results {
        test_id: session.test_id().to_string(),
        user_name: session.user_name().to_string(),
        started_at: session.started_at(),
        total_questions,
        correct_count,
        accuracy,
        total_score,
        max_score,
        score_percentage,
        base_vocabulary: BASE_VOCABULARY,
        vocabulary_increment,
        total_vocabulary,
        tier_stats,
        final_difficulty: session.current_difficulty(),
        recommendation: Recommendation::for_vocabulary(total_vocabulary),
        answers: answers.to_vec(),
    }
}
