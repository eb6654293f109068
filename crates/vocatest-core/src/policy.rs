//! Difficulty adjustment rules.
//!
//! Questions 1 and 2 are always asked at `INITIAL_DIFFICULTY`. Answering
//! question 3 sets the difficulty from the combined result of questions 1 and
//! 2. From then on each correct answer moves one tier up and each wrong answer
//! one tier down, held within `1..=5`.

use crate::model::{Difficulty, INITIAL_DIFFICULTY};
use crate::session::SessionState;

/// Difficulty to target for the question at `question_index`.
#[must_use]
pub fn target_difficulty(question_index: u32, current: Difficulty) -> Difficulty {
    if question_index <= 2 {
        INITIAL_DIFFICULTY
    } else {
        current
    }
}

/// Difficulty after the session's current question was answered.
///
/// `state` must already hold the answer's entry in `first_two_correctness`
/// when the question was number 1 or 2.
#[must_use]
pub fn next_difficulty(state: &SessionState, was_correct: bool) -> Difficulty {
    next_difficulty_for(
        state.question_index(),
        state.current_difficulty(),
        state.first_two_correctness(),
        was_correct,
    )
}

/// The rules behind [`next_difficulty`], over plain values.
#[must_use]
pub fn next_difficulty_for(
    answered_index: u32,
    current: Difficulty,
    first_two: &[bool],
    was_correct: bool,
) -> Difficulty {
    if answered_index <= 2 {
        return INITIAL_DIFFICULTY;
    }

    // The jump after question 3 is computed from questions 1 and 2, not 3.
    if answered_index == 3 {
        if let [first, second] = first_two {
            return match (*first, *second) {
                (true, true) => Difficulty::clamped(4),
                (true, false) | (false, true) => Difficulty::clamped(3),
                (false, false) => Difficulty::clamped(2),
            };
        }
        tracing::debug!(
            "first-two results incomplete ({} recorded), using step rule",
            first_two.len()
        );
    }

    if was_correct {
        current.harder()
    } else {
        current.easier()
    }
}
