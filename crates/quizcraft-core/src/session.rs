//! Quiz session controller.
//!
//! Owns exactly one attempt from start to submission: the current question
//! pointer, per-question answer and review state, and the remaining time.
//! The session is a plain state machine with two states, active and
//! submitted. Time only moves when the owner calls [`QuizSession::tick`];
//! see [`crate::timer`] for the driver that does so once per second.
//!
//! Once submitted, every mutating call except `submit` and `tick` is
//! ignored, so a late timer tick or duplicate submit cannot change a
//! finished result.

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, SessionError};
use crate::model::{
    validate_questions, AnswerRecord, Question, QuestionStatus, QuizSet, QuizSettings,
};
use crate::scoring::{score_attempt, ResultRecord};

/// How a session reached the submitted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitReason {
    Manual,
    Timeout,
}

/// Result of advancing the clock by one second.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Still running with this many seconds left.
    Running(u32),
    /// This tick ran the clock out and submitted the session.
    Expired(ResultRecord),
    /// The session was already submitted; nothing changed.
    Idle,
}

/// A user action, as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select(usize),
    ToggleReview,
    Next,
    Previous,
    GoTo(usize),
    Submit,
}

#[derive(Debug, Clone)]
struct Submission {
    result: ResultRecord,
    reason: SubmitReason,
}

/// One in-progress quiz attempt.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    settings: QuizSettings,
    answers: Vec<AnswerRecord>,
    current: usize,
    remaining_secs: u32,
    submission: Option<Submission>,
}

impl QuizSession {
    /// Start a session. Fails without creating any state if the question
    /// set does not match the settings.
    pub fn start(questions: Vec<Question>, settings: QuizSettings) -> Result<Self, QuizError> {
        validate_questions(&questions, &settings)?;

        let answers = questions
            .iter()
            .map(|q| AnswerRecord::unanswered(q.id))
            .collect();

        tracing::debug!(
            topic = %settings.topic,
            questions = questions.len(),
            timer_minutes = settings.timer_minutes,
            "quiz session started"
        );

        Ok(Self {
            remaining_secs: settings.time_limit_secs(),
            questions,
            settings,
            answers,
            current: 0,
            submission: None,
        })
    }

    pub fn from_set(set: QuizSet) -> Result<Self, QuizError> {
        Self::start(set.questions, set.settings)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_answer(&self) -> &AnswerRecord {
        &self.answers[self.current]
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Seconds used so far.
    pub fn elapsed_secs(&self) -> u32 {
        self.settings.time_limit_secs() - self.remaining_secs
    }

    pub fn is_submitted(&self) -> bool {
        self.submission.is_some()
    }

    /// The stored result, once submitted.
    pub fn result(&self) -> Option<&ResultRecord> {
        self.submission.as_ref().map(|s| &s.result)
    }

    pub fn submit_reason(&self) -> Option<SubmitReason> {
        self.submission.as_ref().map(|s| s.reason)
    }

    pub fn status_of(&self, index: usize) -> Option<QuestionStatus> {
        self.answers.get(index).map(QuestionStatus::from)
    }

    pub fn statuses(&self) -> Vec<QuestionStatus> {
        self.answers.iter().map(QuestionStatus::from).collect()
    }

    pub fn answered_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.selected_option.is_some())
            .count()
    }

    /// Position of the current question as a percentage of the quiz.
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.questions.len() as f64 * 100.0
    }

    /// Record `option` as the answer to the current question, replacing any
    /// earlier choice.
    pub fn select_option(&mut self, option: usize) -> Result<(), SessionError> {
        if self.ignore_when_submitted("select_option") {
            return Ok(());
        }
        let options = self.current_question().options.len();
        if option >= options {
            return Err(SessionError::OptionOutOfRange {
                index: option,
                options,
            });
        }
        self.answers[self.current].selected_option = Some(option);
        Ok(())
    }

    pub fn toggle_review(&mut self) {
        if self.ignore_when_submitted("toggle_review") {
            return;
        }
        let answer = &mut self.answers[self.current];
        answer.marked_for_review = !answer.marked_for_review;
    }

    /// Jump to question `index`.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        if self.ignore_when_submitted("go_to") {
            return Ok(());
        }
        if index >= self.questions.len() {
            return Err(SessionError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Move forward; stays put on the last question.
    pub fn next(&mut self) {
        if self.ignore_when_submitted("next") {
            return;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Move back; stays put on the first question.
    pub fn previous(&mut self) {
        if self.ignore_when_submitted("previous") {
            return;
        }
        self.current = self.current.saturating_sub(1);
    }

    /// Advance the clock by one second, submitting when it runs out.
    pub fn tick(&mut self) -> Tick {
        if self.is_submitted() {
            return Tick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            tracing::info!(topic = %self.settings.topic, "time is up, submitting");
            return Tick::Expired(self.finish(SubmitReason::Timeout));
        }
        Tick::Running(self.remaining_secs)
    }

    /// Submit the attempt and return its result. Calling again returns the
    /// same result without touching the session.
    pub fn submit(&mut self) -> ResultRecord {
        self.finish(SubmitReason::Manual)
    }

    /// Dispatch a [`Command`]. Returns the result when the command submits.
    pub fn apply(&mut self, command: Command) -> Result<Option<ResultRecord>, SessionError> {
        match command {
            Command::Select(option) => self.select_option(option)?,
            Command::ToggleReview => self.toggle_review(),
            Command::Next => self.next(),
            Command::Previous => self.previous(),
            Command::GoTo(index) => self.go_to(index)?,
            Command::Submit => return Ok(Some(self.submit())),
        }
        Ok(None)
    }

    fn finish(&mut self, reason: SubmitReason) -> ResultRecord {
        if let Some(submission) = &self.submission {
            return submission.result.clone();
        }
        let result = score_attempt(
            &self.questions,
            &self.answers,
            &self.settings,
            self.elapsed_secs(),
        );
        tracing::debug!(
            ?reason,
            score = result.score,
            elapsed = result.elapsed_seconds,
            "quiz session submitted"
        );
        self.submission = Some(Submission {
            result: result.clone(),
            reason,
        });
        result
    }

    fn ignore_when_submitted(&self, operation: &str) -> bool {
        if self.is_submitted() {
            tracing::debug!(operation, "ignored on submitted session");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    fn session(n: usize) -> QuizSession {
        QuizSession::start(fixtures::questions(n), fixtures::settings(n as u32)).unwrap()
    }

    #[test]
    fn start_initializes_fresh_state() {
        let s = session(3);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_secs(), 180);
        assert_eq!(s.answers().len(), 3);
        assert!(s.answers().iter().all(|a| a.selected_option.is_none()));
        assert!(s.answers().iter().all(|a| !a.marked_for_review));
        assert!(!s.is_submitted());
    }

    #[test]
    fn start_rejects_malformed_input() {
        assert_eq!(
            QuizSession::start(vec![], fixtures::settings(1)).unwrap_err(),
            QuizError::EmptyQuestionSet
        );
        assert!(matches!(
            QuizSession::start(fixtures::questions(3), fixtures::settings(4)),
            Err(QuizError::QuestionCountMismatch {
                expected: 4,
                actual: 3
            })
        ));

        let mut questions = fixtures::questions(2);
        questions[1].options.push("epsilon".into());
        assert!(matches!(
            QuizSession::start(questions, fixtures::settings(2)),
            Err(QuizError::InvalidOptionCount { question_id: 2, .. })
        ));
    }

    #[test]
    fn last_selection_wins() {
        let mut s = session(2);
        s.select_option(1).unwrap();
        s.select_option(3).unwrap();
        assert_eq!(s.current_answer().selected_option, Some(3));
        assert_eq!(s.answered_count(), 1);

        s.select_option(3).unwrap();
        assert_eq!(s.current_answer().selected_option, Some(3));
    }

    #[test]
    fn out_of_range_option_is_rejected_without_change() {
        let mut s = session(2);
        s.select_option(2).unwrap();
        let err = s.select_option(4).unwrap_err();
        assert_eq!(
            err,
            SessionError::OptionOutOfRange {
                index: 4,
                options: 4
            }
        );
        assert_eq!(s.current_answer().selected_option, Some(2));
        assert!(!s.is_submitted());
    }

    #[test]
    fn toggle_review_without_selection() {
        let mut s = session(2);
        s.toggle_review();
        assert!(s.current_answer().marked_for_review);
        assert_eq!(s.status_of(0), Some(QuestionStatus::Review));
        s.toggle_review();
        assert!(!s.current_answer().marked_for_review);
        assert_eq!(s.status_of(0), Some(QuestionStatus::Unanswered));
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut s = session(3);
        s.previous();
        assert_eq!(s.current_index(), 0);

        s.next();
        s.next();
        assert_eq!(s.current_index(), 2);
        s.next();
        assert_eq!(s.current_index(), 2);

        s.go_to(1).unwrap();
        assert_eq!(s.current_index(), 1);
        assert_eq!(
            s.go_to(3),
            Err(SessionError::QuestionOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn answers_follow_their_question() {
        let mut s = session(3);
        s.select_option(0).unwrap();
        s.next();
        s.select_option(1).unwrap();
        s.go_to(0).unwrap();
        assert_eq!(s.current_answer().selected_option, Some(0));
        assert_eq!(s.answers()[1].selected_option, Some(1));
        assert_eq!(s.answers()[2].selected_option, None);
    }

    #[test]
    fn tick_counts_down() {
        let mut s = session(1);
        assert_eq!(s.tick(), Tick::Running(59));
        assert_eq!(s.tick(), Tick::Running(58));
        assert_eq!(s.elapsed_secs(), 2);
    }

    #[test]
    fn final_tick_submits_exactly_once() {
        let mut s = session(1);
        for _ in 0..59 {
            assert!(matches!(s.tick(), Tick::Running(_)));
        }
        assert_eq!(s.remaining_secs(), 1);

        let Tick::Expired(result) = s.tick() else {
            panic!("expected the last tick to submit");
        };
        assert_eq!(s.remaining_secs(), 0);
        assert!(s.is_submitted());
        assert_eq!(s.submit_reason(), Some(SubmitReason::Timeout));
        assert_eq!(result.elapsed_seconds, 60);

        assert_eq!(s.tick(), Tick::Idle);
        assert_eq!(s.remaining_secs(), 0);
    }

    #[test]
    fn timeout_with_no_interaction_leaves_everything_unanswered() {
        let mut s = session(5);
        let result = loop {
            if let Tick::Expired(result) = s.tick() {
                break result;
            }
        };
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.wrong_count, 0);
        assert_eq!(result.unanswered_count, 5);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.elapsed_seconds, 300);
    }

    #[test]
    fn submit_is_idempotent() {
        let mut s = session(3);
        s.select_option(0).unwrap();
        s.tick();
        let first = s.submit();
        s.tick();
        let second = s.submit();
        assert_eq!(first, second);
        assert_eq!(first.elapsed_seconds, 1);
        assert_eq!(s.submit_reason(), Some(SubmitReason::Manual));
        assert_eq!(s.result(), Some(&first));
    }

    #[test]
    fn mutations_after_submit_are_ignored() {
        let mut s = session(3);
        s.select_option(1).unwrap();
        let result = s.submit();

        assert!(s.select_option(2).is_ok());
        assert!(s.select_option(9).is_ok());
        s.toggle_review();
        s.next();
        assert!(s.go_to(7).is_ok());

        assert_eq!(s.current_index(), 0);
        assert_eq!(s.current_answer().selected_option, Some(1));
        assert!(!s.current_answer().marked_for_review);
        assert_eq!(s.result(), Some(&result));
    }

    #[test]
    fn answers_stay_parallel_to_questions() {
        let mut s = session(4);
        let commands = [
            Command::Select(1),
            Command::Next,
            Command::ToggleReview,
            Command::GoTo(3),
            Command::Select(0),
            Command::Previous,
        ];
        for command in commands {
            s.apply(command).unwrap();
            assert_eq!(s.answers().len(), s.questions().len());
        }
        let result = s.apply(Command::Submit).unwrap().unwrap();
        assert_eq!(result.per_question.len(), 4);
        assert_eq!(s.answers().len(), 4);
    }

    #[test]
    fn apply_reports_rejections() {
        let mut s = session(2);
        assert!(s.apply(Command::Select(7)).is_err());
        assert!(s.apply(Command::GoTo(2)).is_err());
        assert_eq!(s.apply(Command::Next), Ok(None));
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn progress_tracks_position() {
        let mut s = session(4);
        assert!((s.progress() - 25.0).abs() < 1e-9);
        s.go_to(3).unwrap();
        assert!((s.progress() - 100.0).abs() < 1e-9);
    }
}
