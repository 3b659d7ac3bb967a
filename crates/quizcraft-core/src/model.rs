//! Core data model types for quizcraft.
//!
//! Questions, quiz settings, and per-question answer records. These are the
//! types every other part of the system passes around.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

/// Every question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Upper bound on the number of questions in one quiz.
pub const MAX_QUESTIONS: u32 = 50;

/// A single multiple-choice question.
///
/// Field names on the wire match the JSON shape the generator asks the model
/// to produce (`question`, `correct_answer`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier assigned by the question source.
    pub id: u32,
    /// The question text.
    #[serde(rename = "question")]
    pub text: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    #[serde(rename = "correct_answer")]
    pub correct_option: usize,
    /// Why the correct answer is right.
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// Check option count and the correct-answer index.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(QuizError::InvalidOptionCount {
                question_id: self.id,
                count: self.options.len(),
                expected: OPTIONS_PER_QUESTION,
            });
        }
        if self.correct_option >= self.options.len() {
            return Err(QuizError::InvalidCorrectOption {
                question_id: self.id,
                index: self.correct_option,
                options: self.options.len(),
            });
        }
        Ok(())
    }

    /// Letter label for an option index ("A" for 0).
    pub fn option_label(index: usize) -> char {
        (b'A' + (index % 26) as u8) as char
    }
}

/// Quiz difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Mix,
}

impl Difficulty {
    /// Guidance given to the question generator for this level.
    pub fn guidance(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Focus on basic concepts and definitions",
            Difficulty::Medium => "Include application and understanding questions",
            Difficulty::Hard => "Include complex scenarios and analysis questions",
            Difficulty::Mix => "Mix of easy, medium, and hard questions",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
            Difficulty::Mix => write!(f, "mix"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "mix" | "mixed" => Ok(Difficulty::Mix),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Settings fixed at session creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSettings {
    /// What the quiz is about.
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Whether wrong answers subtract `penalty_per_wrong`.
    #[serde(default)]
    pub negative_marking: bool,
    /// Score contribution of each wrong answer, in `[-1.0, 0.0]`.
    #[serde(default, rename = "penalty")]
    pub penalty_per_wrong: f64,
    pub total_questions: u32,
    pub timer_minutes: u32,
}

impl QuizSettings {
    /// Settings for `total_questions` questions on `topic`, one minute per
    /// question and no negative marking.
    pub fn new(topic: impl Into<String>, difficulty: Difficulty, total_questions: u32) -> Self {
        Self {
            topic: topic.into(),
            difficulty,
            negative_marking: false,
            penalty_per_wrong: 0.0,
            total_questions,
            timer_minutes: total_questions.max(1),
        }
    }

    /// Enable negative marking with the given (non-positive) penalty.
    pub fn with_negative_marking(mut self, penalty_per_wrong: f64) -> Self {
        self.negative_marking = true;
        self.penalty_per_wrong = penalty_per_wrong;
        self
    }

    pub fn with_timer_minutes(mut self, minutes: u32) -> Self {
        self.timer_minutes = minutes;
        self
    }

    /// Total time allowed, in seconds.
    pub fn time_limit_secs(&self) -> u32 {
        self.timer_minutes.saturating_mul(60)
    }

    pub fn validate(&self) -> Result<(), QuizError> {
        if self.topic.trim().is_empty() {
            return Err(QuizError::InvalidSettings("topic is empty".into()));
        }
        if !(1..=MAX_QUESTIONS).contains(&self.total_questions) {
            return Err(QuizError::InvalidSettings(format!(
                "total_questions must be between 1 and {MAX_QUESTIONS}, got {}",
                self.total_questions
            )));
        }
        if self.timer_minutes < 1 {
            return Err(QuizError::InvalidSettings(
                "timer_minutes must be at least 1".into(),
            ));
        }
        if !self.penalty_per_wrong.is_finite() || !(-1.0..=0.0).contains(&self.penalty_per_wrong)
        {
            return Err(QuizError::InvalidSettings(format!(
                "penalty must be between -1.0 and 0.0, got {}",
                self.penalty_per_wrong
            )));
        }
        Ok(())
    }
}

/// A question set plus the settings it is played with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSet {
    pub settings: QuizSettings,
    pub questions: Vec<Question>,
}

impl QuizSet {
    /// Full shape check: settings, question count, and every question.
    pub fn validate(&self) -> Result<(), QuizError> {
        validate_questions(&self.questions, &self.settings)
    }
}

/// Validate a question sequence against its settings.
pub fn validate_questions(questions: &[Question], settings: &QuizSettings) -> Result<(), QuizError> {
    if questions.is_empty() {
        return Err(QuizError::EmptyQuestionSet);
    }
    settings.validate()?;
    if questions.len() != settings.total_questions as usize {
        return Err(QuizError::QuestionCountMismatch {
            expected: settings.total_questions as usize,
            actual: questions.len(),
        });
    }
    questions.iter().try_for_each(Question::validate)
}

/// The user's answer state for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: u32,
    pub selected_option: Option<usize>,
    pub marked_for_review: bool,
}

impl AnswerRecord {
    pub fn unanswered(question_id: u32) -> Self {
        Self {
            question_id,
            selected_option: None,
            marked_for_review: false,
        }
    }
}

/// Navigator status of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Answered,
    /// Marked for review; takes precedence over `Answered`.
    Review,
    Unanswered,
}

impl From<&AnswerRecord> for QuestionStatus {
    fn from(answer: &AnswerRecord) -> Self {
        if answer.marked_for_review {
            QuestionStatus::Review
        } else if answer.selected_option.is_some() {
            QuestionStatus::Answered
        } else {
            QuestionStatus::Unanswered
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// `n` questions where the correct answer of question `i` is `i % 4`.
    pub fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: i as u32 + 1,
                text: format!("Question {}?", i + 1),
                options: vec!["alpha".into(), "beta".into(), "gamma".into(), "delta".into()],
                correct_option: i % OPTIONS_PER_QUESTION,
                explanation: format!("Because option {}.", i % OPTIONS_PER_QUESTION),
            })
            .collect()
    }

    pub fn settings(n: u32) -> QuizSettings {
        QuizSettings::new("Rust ownership", Difficulty::Medium, n)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("EASY".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("mixed".parse::<Difficulty>().unwrap(), Difficulty::Mix);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn settings_default_to_one_minute_per_question() {
        let settings = QuizSettings::new("Chemistry", Difficulty::Easy, 12);
        assert_eq!(settings.timer_minutes, 12);
        assert_eq!(settings.time_limit_secs(), 720);
        assert!(!settings.negative_marking);
    }

    #[test]
    fn settings_reject_out_of_range_values() {
        let base = fixtures::settings(10);
        assert!(base.validate().is_ok());

        let mut s = base.clone();
        s.total_questions = 51;
        assert!(s.validate().is_err());

        let s = base.clone().with_timer_minutes(0);
        assert!(s.validate().is_err());

        let s = base.clone().with_negative_marking(-1.5);
        assert!(s.validate().is_err());

        let s = base.clone().with_negative_marking(0.25);
        assert!(s.validate().is_err());

        let mut s = base;
        s.topic = "   ".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn question_shape_checks() {
        let mut q = fixtures::questions(1).remove(0);
        assert!(q.validate().is_ok());

        q.correct_option = 4;
        assert_eq!(
            q.validate(),
            Err(QuizError::InvalidCorrectOption {
                question_id: 1,
                index: 4,
                options: 4
            })
        );

        q.correct_option = 0;
        q.options.pop();
        assert!(matches!(
            q.validate(),
            Err(QuizError::InvalidOptionCount { count: 3, .. })
        ));
    }

    #[test]
    fn question_set_count_must_match_settings() {
        let set = QuizSet {
            settings: fixtures::settings(5),
            questions: fixtures::questions(4),
        };
        assert_eq!(
            set.validate(),
            Err(QuizError::QuestionCountMismatch {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn question_uses_generator_field_names() {
        let json = r#"{
            "id": 3,
            "question": "What is 2 + 2?",
            "options": ["3", "4", "5", "22"],
            "correct_answer": 1,
            "explanation": "Basic arithmetic."
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.text, "What is 2 + 2?");
        assert_eq!(q.correct_option, 1);
    }

    #[test]
    fn review_mark_wins_over_selection() {
        let mut answer = AnswerRecord::unanswered(1);
        assert_eq!(QuestionStatus::from(&answer), QuestionStatus::Unanswered);
        answer.selected_option = Some(2);
        assert_eq!(QuestionStatus::from(&answer), QuestionStatus::Answered);
        answer.marked_for_review = true;
        assert_eq!(QuestionStatus::from(&answer), QuestionStatus::Review);
    }

    #[test]
    fn option_labels() {
        assert_eq!(Question::option_label(0), 'A');
        assert_eq!(Question::option_label(3), 'D');
    }
}
