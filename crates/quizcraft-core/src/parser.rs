//! Quiz file parser.
//!
//! Loads quizzes from TOML or JSON files and directories, writes them back
//! out, and reports non-fatal quality warnings.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Question, QuizSet, QuizSettings};

/// Intermediate TOML structure for quiz files.
#[derive(Debug, Serialize, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlQuizHeader {
    topic: String,
    #[serde(default = "default_difficulty_str")]
    difficulty: String,
    #[serde(default)]
    negative_marking: bool,
    #[serde(default)]
    penalty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_questions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timer_minutes: Option<u32>,
}

fn default_difficulty_str() -> String {
    "medium".to_string()
}

/// Parse a quiz file, choosing the format by extension (`.json` or TOML).
pub fn parse_quiz_file(path: &Path) -> Result<QuizSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    if is_json(path) {
        parse_quiz_json_str(&content, path)
    } else {
        parse_quiz_str(&content, path)
    }
}

/// Parse a TOML string into a `QuizSet` (useful for testing).
///
/// `total_questions` and `timer_minutes` default to the number of
/// questions in the file, i.e. one minute per question.
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<QuizSet> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let difficulty: Difficulty = parsed
        .quiz
        .difficulty
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let count = parsed.questions.len() as u32;
    let settings = QuizSettings {
        topic: parsed.quiz.topic,
        difficulty,
        negative_marking: parsed.quiz.negative_marking,
        penalty_per_wrong: parsed.quiz.penalty,
        total_questions: parsed.quiz.total_questions.unwrap_or(count),
        timer_minutes: parsed.quiz.timer_minutes.unwrap_or(count.max(1)),
    };

    let set = QuizSet {
        settings,
        questions: parsed.questions,
    };
    set.validate()
        .with_context(|| format!("invalid quiz: {}", source_path.display()))?;
    Ok(set)
}

/// Parse a JSON string in `QuizSet` shape.
pub fn parse_quiz_json_str(content: &str, source_path: &Path) -> Result<QuizSet> {
    let set: QuizSet = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;
    set.validate()
        .with_context(|| format!("invalid quiz: {}", source_path.display()))?;
    Ok(set)
}

/// Render a quiz as TOML.
pub fn to_toml_string(set: &QuizSet) -> Result<String> {
    let file = TomlQuizFile {
        quiz: TomlQuizHeader {
            topic: set.settings.topic.clone(),
            difficulty: set.settings.difficulty.to_string(),
            negative_marking: set.settings.negative_marking,
            penalty: set.settings.penalty_per_wrong,
            total_questions: Some(set.settings.total_questions),
            timer_minutes: Some(set.settings.timer_minutes),
        },
        questions: set.questions.clone(),
    };
    toml::to_string_pretty(&file).context("failed to serialize quiz as TOML")
}

/// Write a quiz to `path`, choosing the format by extension.
pub fn save_quiz_file(set: &QuizSet, path: &Path) -> Result<()> {
    let content = if is_json(path) {
        serde_json::to_string_pretty(set).context("failed to serialize quiz as JSON")?
    } else {
        to_toml_string(set)?
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write quiz to {}", path.display()))?;
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Recursively load all `.toml` and `.json` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<QuizSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_quiz_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_quiz_file(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Minimum comfortable time per question, in seconds.
const MIN_SECS_PER_QUESTION: u32 = 30;

/// Check a structurally valid quiz for quality issues.
pub fn validate_quiz(set: &QuizSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for q in &set.questions {
        if !seen_ids.insert(q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in &set.questions {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "question text is empty".into(),
            });
        }

        let distinct: HashSet<String> = q.options.iter().map(|o| o.trim().to_lowercase()).collect();
        if distinct.len() != q.options.len() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "options are not distinct".into(),
            });
        }

        if q.explanation.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "explanation is empty".into(),
            });
        }
    }

    let settings = &set.settings;
    if !settings.negative_marking && settings.penalty_per_wrong != 0.0 {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "penalty {} is ignored because negative_marking is off",
                settings.penalty_per_wrong
            ),
        });
    }

    if settings.time_limit_secs() < settings.total_questions * MIN_SECS_PER_QUESTION {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!(
                "{} minute(s) for {} questions leaves under {}s per question",
                settings.timer_minutes, settings.total_questions, MIN_SECS_PER_QUESTION
            ),
        });
    }

    warnings
}
