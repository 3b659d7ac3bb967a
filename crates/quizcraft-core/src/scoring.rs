//! Scoring engine.
//!
//! A pure transformation from a question set, the recorded answers, the quiz
//! settings and the elapsed time to a [`ResultRecord`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerRecord, Question, QuizSettings};

/// Percentage at or above which an attempt counts as passed.
pub const PASS_PERCENTAGE: f64 = 50.0;

/// Outcome for one question, in question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: u32,
    pub selected: Option<usize>,
    pub correct: usize,
    pub is_correct: bool,
    #[serde(default)]
    pub marked_for_review: bool,
}

/// Scored result of a finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub correct_count: u32,
    pub wrong_count: u32,
    pub unanswered_count: u32,
    /// Final score. Not clamped or rounded; may be negative or fractional
    /// under negative marking.
    pub score: f64,
    pub elapsed_seconds: u32,
    pub per_question: Vec<QuestionOutcome>,
}

/// Coarse banding of an attempt's percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Grade {
    Excellent,
    Good,
    NeedsWork,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Excellent => write!(f, "excellent"),
            Grade::Good => write!(f, "good"),
            Grade::NeedsWork => write!(f, "needs-work"),
        }
    }
}

impl ResultRecord {
    /// Number of questions scored.
    pub fn total(&self) -> u32 {
        self.correct_count + self.wrong_count + self.unanswered_count
    }

    /// Correct answers as a percentage of all questions.
    pub fn percentage(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct_count as f64 / total as f64 * 100.0,
        }
    }

    pub fn passed(&self) -> bool {
        self.percentage() >= PASS_PERCENTAGE
    }

    pub fn grade(&self) -> Grade {
        let pct = self.percentage();
        if pct >= 80.0 {
            Grade::Excellent
        } else if pct >= 60.0 {
            Grade::Good
        } else {
            Grade::NeedsWork
        }
    }

    /// One-line summary suitable for sharing.
    pub fn share_text(&self, topic: &str) -> String {
        format!(
            "I scored {:.1}% ({}/{}) on \"{}\" quiz!",
            self.percentage(),
            self.correct_count,
            self.total(),
            topic
        )
    }
}

/// Score an attempt.
///
/// `answers` is parallel to `questions`; extra entries on either side are
/// ignored. Unanswered questions never incur the penalty.
pub fn score_attempt(
    questions: &[Question],
    answers: &[AnswerRecord],
    settings: &QuizSettings,
    elapsed_seconds: u32,
) -> ResultRecord {
    let mut correct_count = 0u32;
    let mut wrong_count = 0u32;
    let mut unanswered_count = 0u32;

    let per_question = questions
        .iter()
        .zip(answers)
        .map(|(question, answer)| {
            let is_correct = answer.selected_option == Some(question.correct_option);
            match answer.selected_option {
                None => unanswered_count += 1,
                Some(_) if is_correct => correct_count += 1,
                Some(_) => wrong_count += 1,
            }
            QuestionOutcome {
                question_id: question.id,
                selected: answer.selected_option,
                correct: question.correct_option,
                is_correct,
                marked_for_review: answer.marked_for_review,
            }
        })
        .collect();

    let score = if settings.negative_marking {
        correct_count as f64 + wrong_count as f64 * settings.penalty_per_wrong
    } else {
        correct_count as f64
    };

    ResultRecord {
        correct_count,
        wrong_count,
        unanswered_count,
        score,
        elapsed_seconds,
        per_question,
    }
}

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
