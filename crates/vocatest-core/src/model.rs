//! Core data model types for vocatest.
//!
//! These are the fundamental types the whole engine uses to represent
//! questions, difficulty tiers and answered questions, together with the
//! fixed configuration constants of the test.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vocabulary credited to every test-taker before any tier is mastered.
pub const BASE_VOCABULARY: u32 = 500;

/// Number of questions administered in a full session.
pub const MAX_QUESTIONS: u32 = 25;

/// Difficulty of questions 1 and 2, and the starting difficulty of every session.
pub const INITIAL_DIFFICULTY: Difficulty = Difficulty(3);

/// Minimum display-name length, in characters, after trimming.
pub const NAME_MIN_CHARS: usize = 2;

/// Maximum display-name length, in characters, after trimming.
pub const NAME_MAX_CHARS: usize = 20;

/// Static description of one difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    /// Level in `1..=5`.
    pub level: u8,
    /// Human-readable name.
    pub name: &'static str,
    /// Key of this tier's sheet in a question source.
    pub sheet: &'static str,
    /// Score awarded for each correct answer at this tier.
    pub weight: u32,
    /// Vocabulary added when this tier is fully mastered.
    pub increment: u32,
    /// Short description shown to test-takers.
    pub description: &'static str,
}

/// The five difficulty tiers, lowest first.
pub const TIERS: [Tier; 5] = [
    Tier {
        level: 1,
        name: "Primary & middle school",
        sheet: "primary",
        weight: 1,
        increment: 1800,
        description: "Everyday core words, suitable for beginners",
    },
    Tier {
        level: 2,
        name: "High school",
        sheet: "high_school",
        weight: 2,
        increment: 1700,
        description: "Intermediate words at high-school level",
    },
    Tier {
        level: 3,
        name: "CET-4/6",
        sheet: "cet",
        weight: 3,
        increment: 2500,
        description: "Core vocabulary of the college English exams",
    },
    Tier {
        level: 4,
        name: "TEM-4 / IELTS / TOEFL",
        sheet: "ielts_toefl",
        weight: 4,
        increment: 4000,
        description: "Words common in professional and study-abroad exams",
    },
    Tier {
        level: 5,
        name: "GRE / TEM-8",
        sheet: "gre",
        weight: 5,
        increment: 5000,
        description: "Advanced academic and graduate-level words",
    },
];

/// A difficulty level, always within `1..=5`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// The easiest tier.
    pub const MIN: Difficulty = Difficulty(1);
    /// The hardest tier.
    pub const MAX: Difficulty = Difficulty(5);
    /// Every tier, lowest first.
    pub const ALL: [Difficulty; 5] = [
        Difficulty(1),
        Difficulty(2),
        Difficulty(3),
        Difficulty(4),
        Difficulty(5),
    ];

    /// Returns `None` when `level` is outside `1..=5`.
    #[must_use]
    pub fn new(level: u8) -> Option<Self> {
        (1..=5).contains(&level).then_some(Self(level))
    }

    /// Builds a difficulty, clamping `level` into `1..=5`.
    #[must_use]
    pub fn clamped(level: i32) -> Self {
        // The clamp keeps the value within u8 range.
        Self(level.clamp(1, 5) as u8)
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }

    /// One level up, held at the top tier.
    #[must_use]
    pub fn harder(self) -> Self {
        Self((self.0 + 1).min(Self::MAX.0))
    }

    /// One level down, held at the bottom tier.
    #[must_use]
    pub fn easier(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN.0))
    }

    /// Static tier configuration for this level.
    #[must_use]
    pub fn tier(self) -> &'static Tier {
        &TIERS[usize::from(self.0 - 1)]
    }

    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Debug for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Difficulty({})", self.0)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lv.{}", self.0)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Difficulty::new(level).ok_or_else(|| format!("difficulty must be 1-5, got {level}"))
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

/// A single multiple-choice vocabulary question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique within a bank, e.g. `L3_12`.
    pub id: String,
    /// The prompt shown to the test-taker.
    pub text: String,
    /// Option texts in display order; empty strings are placeholders.
    pub options: Vec<String>,
    /// Index of the correct option.
    pub correct_index: usize,
    pub difficulty: Difficulty,
}

impl Question {
    /// Text of the correct option (empty if it points at a placeholder).
    #[must_use]
    pub fn correct_option(&self) -> &str {
        self.options
            .get(self.correct_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Non-empty options with their positions.
    pub fn choices(&self) -> impl Iterator<Item = (usize, &str)> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| !option.trim().is_empty())
            .map(|(idx, option)| (idx, option.as_str()))
    }

    /// Returns `true` if `text` is one of the non-empty options.
    #[must_use]
    pub fn has_choice(&self, text: &str) -> bool {
        self.choices().any(|(_, option)| option == text)
    }
}

/// Maps an option letter (`A`-`D`, case-insensitive) to its index.
#[must_use]
pub fn option_index_from_letter(code: &str) -> Option<usize> {
    match code.trim().to_ascii_uppercase().as_str() {
        "A" => Some(0),
        "B" => Some(1),
        "C" => Some(2),
        "D" => Some(3),
        _ => None,
    }
}

/// Display letter for an option index.
#[must_use]
pub fn option_letter(index: usize) -> char {
    const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];
    LETTERS.get(index).copied().unwrap_or('?')
}

/// One administered question and the answer given to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub question_text: String,
    /// Option text the test-taker selected.
    pub selected_option: String,
    pub correct_option: String,
    pub is_correct: bool,
    pub difficulty: Difficulty,
    /// 1-based position of the question within the session.
    pub question_index: u32,
}
