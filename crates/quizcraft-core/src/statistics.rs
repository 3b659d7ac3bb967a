//! Aggregate statistics over saved attempts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Difficulty;
use crate::report::AttemptReport;

/// Totals across a set of attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_attempts: usize,
    pub total_correct: u32,
    pub total_questions: u32,
    /// Correct answers as a percentage of all questions attempted.
    pub average_percentage: f64,
    pub total_seconds: u64,
    /// Attempts at or above the pass mark.
    pub passed: usize,
    pub best_percentage: f64,
    /// Attempt count by difficulty.
    pub by_difficulty: BTreeMap<String, usize>,
}

impl HistoryStats {
    pub fn from_attempts(attempts: &[AttemptReport]) -> Self {
        let mut stats = HistoryStats {
            total_attempts: attempts.len(),
            ..Default::default()
        };

        for attempt in attempts {
            let result = &attempt.result;
            stats.total_correct += result.correct_count;
            stats.total_questions += result.total();
            stats.total_seconds += u64::from(result.elapsed_seconds);
            if result.passed() {
                stats.passed += 1;
            }
            stats.best_percentage = stats.best_percentage.max(result.percentage());
            *stats
                .by_difficulty
                .entry(attempt.settings.difficulty.to_string())
                .or_default() += 1;
        }

        if stats.total_questions > 0 {
            stats.average_percentage =
                stats.total_correct as f64 / stats.total_questions as f64 * 100.0;
        }
        stats
    }

    /// Whole minutes spent across all attempts.
    pub fn total_minutes(&self) -> u64 {
        self.total_seconds / 60
    }

    pub fn attempts_at(&self, difficulty: Difficulty) -> usize {
        self.by_difficulty
            .get(&difficulty.to_string())
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::session::QuizSession;

    fn attempt(n: usize, correct: usize, elapsed: u32, difficulty: Difficulty) -> AttemptReport {
        let mut settings = fixtures::settings(n as u32);
        settings.difficulty = difficulty;
        let mut session = QuizSession::start(fixtures::questions(n), settings).unwrap();
        for i in 0..correct {
            session.go_to(i).unwrap();
            session.select_option(i % 4).unwrap();
        }
        for _ in 0..elapsed {
            session.tick();
        }
        session.submit();
        AttemptReport::from_session(&session, None).unwrap()
    }

    #[test]
    fn empty_history() {
        let stats = HistoryStats::from_attempts(&[]);
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.average_percentage, 0.0);
        assert_eq!(stats.total_minutes(), 0);
    }

    #[test]
    fn totals_and_average() {
        let attempts = vec![
            attempt(4, 4, 90, Difficulty::Easy),
            attempt(6, 1, 100, Difficulty::Hard),
            attempt(10, 5, 200, Difficulty::Hard),
        ];
        let stats = HistoryStats::from_attempts(&attempts);

        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.total_correct, 10);
        assert_eq!(stats.total_questions, 20);
        assert!((stats.average_percentage - 50.0).abs() < 1e-9);
        assert_eq!(stats.total_seconds, 390);
        assert_eq!(stats.total_minutes(), 6);
        assert_eq!(stats.passed, 2);
        assert!((stats.best_percentage - 100.0).abs() < 1e-9);
        assert_eq!(stats.attempts_at(Difficulty::Hard), 2);
        assert_eq!(stats.attempts_at(Difficulty::Mix), 0);
    }
}
