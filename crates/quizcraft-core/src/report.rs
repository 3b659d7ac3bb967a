//! Attempt reports with JSON persistence.
//!
//! An [`AttemptReport`] is what a finished session hands to the result
//! sink: the quiz as played, the scored result, and when it happened.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Question, QuizSet, QuizSettings};
use crate::scoring::ResultRecord;
use crate::session::{QuizSession, SubmitReason};

/// File name prefix for saved attempts.
pub const ATTEMPT_FILE_PREFIX: &str = "attempt-";

/// A finished, scored attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// When the attempt was submitted.
    pub created_at: DateTime<Utc>,
    pub settings: QuizSettings,
    pub questions: Vec<Question>,
    pub result: ResultRecord,
    pub submit_reason: SubmitReason,
    /// Display name for attempts taken without an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
}

impl AttemptReport {
    /// Build a report from a submitted session. Returns `None` while the
    /// session is still active.
    pub fn from_session(session: &QuizSession, guest_name: Option<String>) -> Option<Self> {
        let result = session.result()?.clone();
        let submit_reason = session.submit_reason()?;
        Some(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            settings: session.settings().clone(),
            questions: session.questions().to_vec(),
            result,
            submit_reason,
            guest_name,
        })
    }

    /// The quiz as played, for retaking it.
    pub fn quiz(&self) -> QuizSet {
        QuizSet {
            settings: self.settings.clone(),
            questions: self.questions.clone(),
        }
    }

    /// Default file name: `attempt-<timestamp>-<short id>.json`.
    pub fn file_name(&self) -> String {
        format!(
            "{}{}-{}.json",
            ATTEMPT_FILE_PREFIX,
            self.created_at.format("%Y-%m-%dT%H%M%S"),
            &self.id.simple().to_string()[..8]
        )
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize attempt")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write attempt to {}", path.display()))?;
        Ok(())
    }

    /// Save under `dir` using [`AttemptReport::file_name`].
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.save_json(&path)?;
        tracing::info!(path = %path.display(), "attempt saved");
        Ok(path)
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read attempt from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse attempt JSON")?;
        Ok(report)
    }
}

/// Load every saved attempt in `dir`, newest first. Unreadable files are
/// skipped with a warning; a missing directory yields no attempts.
pub fn load_attempts(dir: &Path) -> Result<Vec<AttemptReport>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut attempts = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        let is_attempt = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(ATTEMPT_FILE_PREFIX) && n.ends_with(".json"));
        if !is_attempt {
            continue;
        }
        match AttemptReport::load_json(&path) {
            Ok(report) => attempts.push(report),
            Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
        }
    }

    attempts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(attempts)
}
