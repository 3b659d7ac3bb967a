//! quizcraft-core: Quiz session state machine, scoring, and data model.
//!
//! This crate defines the quiz data model, the session controller that runs
//! one attempt, the scoring engine, and the provider trait that the rest of
//! quizcraft builds on.

pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod timer;
pub mod traits;
