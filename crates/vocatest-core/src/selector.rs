//! Question selection with a no-repeat guarantee.

use std::collections::BTreeSet;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::bank::QuestionBank;
use crate::model::{Difficulty, Question};

/// Pick an unused question, preferring the target tier.
///
/// Chooses uniformly among unused questions of `target`; if there are none,
/// chooses uniformly among all unused questions. The chosen id is added to
/// `used` before returning. `None` means the bank is exhausted.
pub fn select_question<'a, R: Rng + ?Sized>(
    bank: &'a QuestionBank,
    target: Difficulty,
    used: &mut BTreeSet<String>,
    rng: &mut R,
) -> Option<&'a Question> {
    let same_tier: Vec<&Question> = bank.tier(target).filter(|q| !used.contains(&q.id)).collect();

    let pool = if same_tier.is_empty() {
        let rest: Vec<&Question> = bank.iter().filter(|q| !used.contains(&q.id)).collect();
        if !rest.is_empty() {
            tracing::debug!(
                "no unused questions at {target}, falling back to {} from other tiers",
                rest.len()
            );
        }
        rest
    } else {
        same_tier
    };

    let question = *pool.choose(rng)?;
    used.insert(question.id.clone());
    Some(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::INITIAL_DIFFICULTY;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(id: &str, level: u8) -> Question {
        Question {
            id: id.into(),
            text: id.into(),
            options: vec!["yes".into(), "no".into()],
            correct_index: 0,
            difficulty: Difficulty::new(level).unwrap(),
        }
    }

    fn bank() -> QuestionBank {
        QuestionBank::from_questions(vec![
            question("L1_1", 1),
            question("L3_1", 3),
            question("L3_2", 3),
            question("L3_3", 3),
            question("L5_1", 5),
        ])
    }

    #[test]
    fn prefers_target_tier() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(7);
        let mut used = BTreeSet::new();

        for _ in 0..3 {
            let q = select_question(&bank, Difficulty::new(3).unwrap(), &mut used, &mut rng).unwrap();
            assert_eq!(q.difficulty.level(), 3);
        }
        assert_eq!(used.len(), 3);
    }

    #[test]
    fn falls_back_when_tier_exhausted() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(1);
        let mut used: BTreeSet<String> = ["L5_1".to_string()].into_iter().collect();

        let q = select_question(&bank, Difficulty::MAX, &mut used, &mut rng).unwrap();
        assert_ne!(q.id, "L5_1");
        assert!(used.contains(&q.id));
    }

    #[test]
    fn never_repeats_and_reports_exhaustion() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(42);
        let mut used = BTreeSet::new();
        let mut seen = Vec::new();

        while let Some(q) = select_question(&bank, Difficulty::new(2).unwrap(), &mut used, &mut rng) {
            assert!(!seen.contains(&q.id), "question {} selected twice", q.id);
            seen.push(q.id.clone());
        }
        assert_eq!(seen.len(), bank.len());
        assert_eq!(used.len(), bank.len());
    }

    #[test]
    fn same_seed_same_choices() {
        let bank = bank();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut used = BTreeSet::new();
            std::iter::from_fn(|| {
                select_question(&bank, INITIAL_DIFFICULTY, &mut used, &mut rng).map(|q| q.id.clone())
            })
            .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn empty_bank_yields_none() {
        let bank = QuestionBank::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut used = BTreeSet::new();
        assert!(select_question(&bank, Difficulty::MIN, &mut used, &mut rng).is_none());
        assert!(used.is_empty());
    }
}
