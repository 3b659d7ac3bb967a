//! The `quizcraft validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizcraft_core::parser;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let sets = if quiz_path.is_dir() {
        parser::load_quiz_directory(&quiz_path)?
    } else {
        vec![parser::parse_quiz_file(&quiz_path)?]
    };

    let mut total_warnings = 0;

    for set in &sets {
        println!(
            "Quiz: {} ({} questions, {}, {} minutes)",
            set.settings.topic,
            set.questions.len(),
            set.settings.difficulty,
            set.settings.timer_minutes
        );

        let warnings = parser::validate_quiz(set);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [q{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if sets.is_empty() {
        println!("No quiz files found.");
    } else if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
