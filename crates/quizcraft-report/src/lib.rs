//! quizcraft-report: Results pages for finished quiz attempts.

pub mod html;
