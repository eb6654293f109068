//! The test driver.
//!
//! `VocabularyTest` owns the question bank, the results sink, the random
//! source and the current phase, and exposes the only operations that move a
//! test between the welcome, testing and results phases.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::bank::QuestionBank;
use crate::error::{PhaseKind, SessionError};
use crate::history::ResultRecord;
use crate::model::{AnswerRecord, Difficulty, Question};
use crate::scoring::{self, Results};
use crate::session::SessionState;
use crate::traits::{NoopSink, ResultsSink};

/// Source of the current time.
pub type Clock = fn() -> DateTime<Utc>;

/// A finished test.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTest {
    /// The session as it stood when the test ended.
    pub session: SessionState,
    pub results: Results,
    pub completed_at: DateTime<Utc>,
    /// Whether the results sink accepted the record.
    pub saved: bool,
}

/// Where a test currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum TestPhase {
    Welcome,
    Testing(SessionState),
    Results(CompletedTest),
}

impl TestPhase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            TestPhase::Welcome => PhaseKind::Welcome,
            TestPhase::Testing(_) => PhaseKind::Testing,
            TestPhase::Results(_) => PhaseKind::Results,
        }
    }
}

/// What happened after an answer was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub record: AnswerRecord,
    /// Difficulty after applying the answer.
    pub next_difficulty: Difficulty,
    /// `true` if this answer completed the test.
    pub finished: bool,
}

/// Drives one test-taker through welcome, testing and results.
pub struct VocabularyTest<R: Rng> {
    bank: Arc<QuestionBank>,
    sink: Box<dyn ResultsSink>,
    rng: R,
    clock: Clock,
    phase: TestPhase,
}

impl<R: Rng> VocabularyTest<R> {
    /// A driver in the welcome phase that discards results.
    pub fn new(bank: Arc<QuestionBank>, rng: R) -> Self {
        Self {
            bank,
            sink: Box::new(NoopSink),
            rng,
            clock: Utc::now,
            phase: TestPhase::Welcome,
        }
    }

    /// Send finished results to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: impl ResultsSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn phase(&self) -> &TestPhase {
        &self.phase
    }

    /// The session in progress, if testing.
    pub fn session(&self) -> Option<&SessionState> {
        match &self.phase {
            TestPhase::Testing(session) => Some(session),
            _ => None,
        }
    }

    /// The finished test, if in the results phase.
    pub fn completed(&self) -> Option<&CompletedTest> {
        match &self.phase {
            TestPhase::Results(completed) => Some(completed),
            _ => None,
        }
    }

    pub fn results(&self) -> Option<&Results> {
        self.completed().map(|c| &c.results)
    }

    /// Begin a test for `name`.
    ///
    /// # Errors
    ///
    /// Fails without changing state outside the welcome phase, when the bank
    /// is empty, or when the name is not 2-20 characters after trimming.
    /// From the results phase a new attempt goes through [`retake`](Self::retake).
    pub fn start_test(&mut self, name: &str) -> Result<&SessionState, SessionError> {
        if !matches!(self.phase, TestPhase::Welcome) {
            return Err(SessionError::InvalidTransition {
                phase: self.phase.kind(),
                action: "start a test",
            });
        }
        self.begin(name)
    }

    fn begin(&mut self, name: &str) -> Result<&SessionState, SessionError> {
        if self.bank.is_empty() {
            return Err(SessionError::EmptyBank);
        }

        let session = SessionState::new(name, (self.clock)()).inspect_err(|e| {
            tracing::warn!("rejected display name: {e}");
        })?;
        tracing::info!(
            "starting test {} for {} ({} questions in bank)",
            session.test_id(),
            session.user_name(),
            self.bank.len()
        );
        self.phase = TestPhase::Testing(session);
        self.session().ok_or(SessionError::NotTesting)
    }

    /// The question being asked, selecting one if none is in flight.
    ///
    /// Returns `None` outside the testing phase. When the session is complete
    /// or the bank has nothing left to ask, the test finishes and `None` is
    /// returned.
    pub fn current_question(&mut self) -> Option<&Question> {
        let done = match &mut self.phase {
            TestPhase::Testing(session) => {
                session.is_exhausted() || session.select_next(&self.bank, &mut self.rng).is_none()
            }
            _ => return None,
        };
        if done {
            self.finish();
            return None;
        }
        self.session().and_then(SessionState::question_in_flight)
    }

    /// Answer the question in flight with the text of one of its options.
    ///
    /// # Errors
    ///
    /// Fails without changing state outside the testing phase, when no
    /// question is in flight, or when `selected` is not one of its options.
    pub fn submit_answer(&mut self, selected: &str) -> Result<AnswerOutcome, SessionError> {
        let session = match &mut self.phase {
            TestPhase::Testing(session) => session,
            other => {
                tracing::debug!("ignoring answer in the {} phase", other.kind());
                return Err(SessionError::InvalidTransition {
                    phase: other.kind(),
                    action: "submit an answer",
                });
            }
        };

        let record = session.record_answer(selected)?;
        let next_difficulty = session.current_difficulty();
        let finished = session.is_exhausted();
        if finished {
            self.finish();
        }

        Ok(AnswerOutcome {
            record,
            next_difficulty,
            finished,
        })
    }

    /// Answer the question in flight by option position.
    ///
    /// # Errors
    ///
    /// As [`submit_answer`](Self::submit_answer), plus
    /// `SessionError::OptionOutOfRange` if `index` names no non-empty option.
    pub fn submit_choice(&mut self, index: usize) -> Result<AnswerOutcome, SessionError> {
        let selected = match &self.phase {
            TestPhase::Testing(session) => {
                let question = session
                    .question_in_flight()
                    .ok_or(SessionError::NoQuestionInFlight)?;
                question
                    .options
                    .get(index)
                    .filter(|option| !option.trim().is_empty())
                    .cloned()
                    .ok_or(SessionError::OptionOutOfRange(index))?
            }
            other => {
                return Err(SessionError::InvalidTransition {
                    phase: other.kind(),
                    action: "submit an answer",
                })
            }
        };
        self.submit_answer(&selected)
    }

    /// Abandon whatever is in progress and return to the welcome phase.
    pub fn reset(&mut self) {
        if let TestPhase::Testing(session) = &self.phase {
            tracing::info!(
                "discarding test {} after {} answers",
                session.test_id(),
                session.answers().len()
            );
        }
        self.phase = TestPhase::Welcome;
    }

    /// Start a fresh test for the same test-taker.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless in the results phase.
    pub fn retake(&mut self) -> Result<&SessionState, SessionError> {
        let name = match &self.phase {
            TestPhase::Results(completed) => completed.results.user_name.clone(),
            other => {
                return Err(SessionError::InvalidTransition {
                    phase: other.kind(),
                    action: "retake the test",
                })
            }
        };
        self.begin(&name)
    }

    /// Score the running session and hand the record to the sink.
    fn finish(&mut self) {
        let session = match std::mem::replace(&mut self.phase, TestPhase::Welcome) {
            TestPhase::Testing(session) => session,
            other => {
                self.phase = other;
                return;
            }
        };

        let results = scoring::score(&session);
        let completed_at = (self.clock)();
        let record = ResultRecord::from_results(&results);
        let saved = match self.sink.record(&record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to save results for {}: {e:#}", results.test_id);
                false
            }
        };

        tracing::info!(
            "test {} finished: {}/{} correct, ~{} words, final {}",
            results.test_id,
            results.correct_count,
            results.total_questions,
            results.vocabulary_words(),
            results.final_difficulty
        );

        self.phase = TestPhase::Results(CompletedTest {
            session,
            results,
            completed_at,
            saved,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{INITIAL_DIFFICULTY, MAX_QUESTIONS};
    use crate::scoring::Recommendation;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap()
    }

    fn question(level: u8, row: usize) -> Question {
        Question {
            id: format!("L{level}_{row}"),
            text: format!("word {level}.{row}"),
            options: vec!["right".into(), "wrong".into(), "other".into(), String::new()],
            correct_index: 0,
            difficulty: Difficulty::new(level).unwrap(),
        }
    }

    fn bank(per_tier: usize) -> Arc<QuestionBank> {
        Arc::new(
            (1..=5u8)
                .flat_map(|level| (1..=per_tier).map(move |row| question(level, row)))
                .collect(),
        )
    }

    fn driver(bank: Arc<QuestionBank>, seed: u64) -> VocabularyTest<StdRng> {
        VocabularyTest::new(bank, StdRng::seed_from_u64(seed)).with_clock(fixed_clock)
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<ResultRecord>>>);

    impl ResultsSink for RecordingSink {
        fn record(&self, record: &ResultRecord) -> anyhow::Result<()> {
            self.0.borrow_mut().push(record.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl ResultsSink for FailingSink {
        fn record(&self, _: &ResultRecord) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    /// Answer until the test ends, choosing by question number.
    fn run_to_end(test: &mut VocabularyTest<StdRng>, answer: impl Fn(u32) -> &'static str) {
        while test.current_question().is_some() {
            let index = test.session().unwrap().question_index();
            test.submit_answer(answer(index)).unwrap();
        }
    }

    #[test]
    fn all_correct_converges_to_top_tier() {
        let sink = RecordingSink::default();
        let mut test = driver(bank(25), 1).with_sink(sink.clone());
        test.start_test("Alice").unwrap();

        let mut asked = Vec::new();
        while let Some(q) = test.current_question() {
            asked.push(q.difficulty.level());
            test.submit_answer("right").unwrap();
        }

        assert_eq!(asked.len(), MAX_QUESTIONS as usize);
        assert_eq!(&asked[..4], &[3, 3, 3, 4]);
        assert!(asked[4..].iter().all(|&level| level == 5));

        let completed = test.completed().unwrap();
        let results = &completed.results;
        assert!(completed.saved);
        assert_eq!(results.total_questions, MAX_QUESTIONS);
        assert_eq!(results.final_difficulty, Difficulty::MAX);
        assert_eq!(results.vocabulary_words(), 500 + 2500 + 4000 + 5000);
        assert_eq!(results.tier(Difficulty::MIN).unwrap().total, 0);
        assert_eq!(results.tier(Difficulty::new(2).unwrap()).unwrap().mastery, 0.0);
        assert_eq!(results.recommendation, Recommendation::ReadWidely);
        assert_eq!(results.accuracy, 100.0);

        let records = sink.0.borrow();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_vocabulary, 12000);
        assert_eq!(records[0].final_difficulty, 5);
    }

    #[test]
    fn single_question_bank_ends_early() {
        let bank = Arc::new(QuestionBank::from_questions(vec![question(1, 1)]));
        let mut test = driver(bank, 3);
        test.start_test("Alice").unwrap();

        let first = test.current_question().unwrap();
        assert_eq!(first.id, "L1_1");
        let outcome = test.submit_answer("right").unwrap();
        assert!(!outcome.finished);

        assert!(test.current_question().is_none());
        let results = test.results().unwrap();
        assert_eq!(results.total_questions, 1);
        assert_eq!(results.correct_count, 1);
    }

    #[test]
    fn first_two_answers_set_the_fourth_target() {
        let cases = [
            (("right", "right"), 4),
            (("right", "wrong"), 3),
            (("wrong", "right"), 3),
            (("wrong", "wrong"), 2),
        ];
        for seed in [1, 2, 3] {
            for ((first, second), expected) in cases {
                let mut test = driver(bank(25), seed);
                test.start_test("Alice").unwrap();
                for answer in [first, second, "wrong"] {
                    test.current_question().unwrap();
                    test.submit_answer(answer).unwrap();
                }
                let session = test.session().unwrap();
                assert_eq!(session.current_difficulty().level(), expected);
                assert_eq!(session.target_difficulty().level(), expected);
                assert_eq!(test.current_question().unwrap().difficulty.level(), expected);
            }
        }
    }

    #[test]
    fn difficulty_stays_in_range_and_ids_never_repeat() {
        let mut test = driver(bank(6), 17);
        test.start_test("Alice").unwrap();
        while let Some(q) = test.current_question() {
            let answer = if q.id.ends_with('3') { "wrong" } else { "right" };
            test.submit_answer(answer).unwrap();
            if let Some(session) = test.session() {
                assert_eq!(session.used_question_ids().len(), session.answers().len());
                assert!((1..=5).contains(&session.current_difficulty().level()));
            }
        }
        let completed = test.completed().unwrap();
        let used = completed.session.used_question_ids();
        assert_eq!(used.len(), completed.results.answers.len());
    }

    #[test]
    fn invalid_name_leaves_welcome() {
        let mut test = driver(bank(2), 0);
        assert_eq!(
            test.start_test("A").unwrap_err(),
            SessionError::InvalidName { len: 1 }
        );
        assert_eq!(test.phase(), &TestPhase::Welcome);
        assert!(test.start_test(&"x".repeat(21)).is_err());
        assert!(test.start_test("Al").is_ok());
    }

    #[test]
    fn empty_bank_cannot_start() {
        let mut test = driver(Arc::new(QuestionBank::default()), 0);
        assert_eq!(test.start_test("Alice").unwrap_err(), SessionError::EmptyBank);
        assert_eq!(test.phase().kind(), PhaseKind::Welcome);
    }

    #[test]
    fn answers_outside_testing_are_rejected() {
        let mut test = driver(bank(25), 5);
        assert!(matches!(
            test.submit_answer("right"),
            Err(SessionError::InvalidTransition {
                phase: PhaseKind::Welcome,
                ..
            })
        ));
        assert!(test.current_question().is_none());
        assert_eq!(test.phase(), &TestPhase::Welcome);

        test.start_test("Alice").unwrap();
        run_to_end(&mut test, |_| "right");
        let before = test.phase().clone();
        assert!(test.submit_answer("right").is_err());
        assert!(test.submit_choice(0).is_err());
        assert_eq!(test.phase(), &before);
    }

    #[test]
    fn starting_twice_is_rejected() {
        let mut test = driver(bank(2), 5);
        test.start_test("Alice").unwrap();
        let before = test.phase().clone();
        assert!(matches!(
            test.start_test("Bob"),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert_eq!(test.phase(), &before);
    }

    #[test]
    fn start_from_results_is_rejected() {
        let bank = Arc::new(QuestionBank::from_questions(vec![question(1, 1)]));
        let sink = RecordingSink::default();
        let mut test = driver(bank, 2).with_sink(sink.clone());
        test.start_test("Alice").unwrap();
        run_to_end(&mut test, |_| "right");
        assert_eq!(test.phase().kind(), PhaseKind::Results);

        let before = test.phase().clone();
        assert_eq!(
            test.start_test("Mallory").unwrap_err(),
            SessionError::InvalidTransition {
                phase: PhaseKind::Results,
                action: "start a test",
            }
        );
        assert_eq!(test.phase(), &before);
        assert_eq!(sink.0.borrow().len(), 1);

        // The results phase leads back to testing only through a retake.
        assert_eq!(test.retake().unwrap().user_name(), "Alice");
    }

    #[test]
    fn submit_choice_resolves_option_text() {
        let mut test = driver(bank(25), 9);
        test.start_test("Alice").unwrap();
        assert_eq!(
            test.submit_choice(0).unwrap_err(),
            SessionError::NoQuestionInFlight
        );

        test.current_question().unwrap();
        assert_eq!(
            test.submit_choice(3).unwrap_err(),
            SessionError::OptionOutOfRange(3)
        );
        let outcome = test.submit_choice(1).unwrap();
        assert!(!outcome.record.is_correct);
        assert_eq!(outcome.record.selected_option, "wrong");
        assert_eq!(outcome.next_difficulty, INITIAL_DIFFICULTY);
    }

    #[test]
    fn reset_and_retake() {
        let mut test = driver(bank(25), 21);
        test.start_test("  Alice ").unwrap();
        test.current_question().unwrap();
        test.submit_answer("right").unwrap();
        test.reset();
        assert_eq!(test.phase(), &TestPhase::Welcome);
        assert!(test.retake().is_err());

        test.start_test("Alice").unwrap();
        run_to_end(&mut test, |i| if i % 2 == 0 { "wrong" } else { "right" });
        assert_eq!(test.phase().kind(), PhaseKind::Results);

        let session = test.retake().unwrap();
        assert_eq!(session.user_name(), "Alice");
        assert!(session.answers().is_empty());
        assert_eq!(session.current_difficulty(), INITIAL_DIFFICULTY);

        test.reset();
        assert!(test.results().is_none());
    }

    #[test]
    fn scoring_the_final_session_is_idempotent() {
        let mut test = driver(bank(25), 8);
        test.start_test("Alice").unwrap();
        run_to_end(&mut test, |i| if i % 3 == 0 { "wrong" } else { "right" });

        let completed = test.completed().unwrap();
        assert_eq!(scoring::score(&completed.session), completed.results);
        assert_eq!(
            scoring::score(&completed.session),
            scoring::score(&completed.session)
        );
        assert_eq!(completed.results.final_difficulty, completed.session.current_difficulty());
    }

    #[test]
    fn failing_sink_keeps_results() {
        let mut test = driver(bank(25), 4).with_sink(FailingSink);
        test.start_test("Alice").unwrap();
        run_to_end(&mut test, |_| "right");

        let completed = test.completed().unwrap();
        assert!(!completed.saved);
        assert_eq!(completed.results.total_questions, MAX_QUESTIONS);
        assert_eq!(completed.completed_at, fixed_clock());
    }
}
