//! In-memory question bank, indexed by difficulty tier.

use std::collections::HashMap;

use crate::model::{Difficulty, Question};

/// An immutable collection of questions.
///
/// Question ids are unique within a bank; tiers may be empty.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    by_id: HashMap<String, usize>,
    by_tier: [Vec<usize>; 5],
}

impl QuestionBank {
    /// Build a bank, keeping the first question for any repeated id.
    pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let mut bank = Self::default();
        for question in questions {
            if bank.by_id.contains_key(&question.id) {
                tracing::warn!("duplicate question id '{}', keeping the first", question.id);
                continue;
            }
            let idx = bank.questions.len();
            bank.by_id.insert(question.id.clone(), idx);
            bank.by_tier[question.difficulty.index()].push(idx);
            bank.questions.push(question);
        }
        bank
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// All questions in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.by_id.get(id).map(|&idx| &self.questions[idx])
    }

    /// Questions of one tier, in load order.
    pub fn tier(&self, difficulty: Difficulty) -> impl Iterator<Item = &Question> {
        self.by_tier[difficulty.index()]
            .iter()
            .map(move |&idx| &self.questions[idx])
    }

    /// Number of questions per tier, lowest tier first.
    #[must_use]
    pub fn tier_counts(&self) -> [usize; 5] {
        let mut counts = [0; 5];
        for (count, tier) in counts.iter_mut().zip(&self.by_tier) {
            *count = tier.len();
        }
        counts
    }
}

impl FromIterator<Question> for QuestionBank {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        Self::from_questions(iter)
    }
}
