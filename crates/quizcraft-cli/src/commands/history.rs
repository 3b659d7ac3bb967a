//! The `quizcraft history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizcraft_core::report::load_attempts;
use quizcraft_core::scoring::format_clock;
use quizcraft_core::statistics::HistoryStats;
use quizcraft_providers::config::load_config_from;
use quizcraft_report::html::format_score;

pub fn execute(
    dir: Option<PathBuf>,
    limit: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => load_config_from(config_path.as_deref())?.output_dir,
    };

    let attempts = load_attempts(&dir)?;
    if attempts.is_empty() {
        println!("No attempts found in {}", dir.display());
        return Ok(());
    }

    let shown = limit.unwrap_or(attempts.len()).min(attempts.len());

    let mut table = Table::new();
    table.set_header(vec![
        "Date", "Topic", "Difficulty", "Score", "Correct", "%", "Time", "Result",
    ]);
    for attempt in &attempts[..shown] {
        let result = &attempt.result;
        let topic = match &attempt.guest_name {
            Some(name) => format!("{} ({name})", attempt.settings.topic),
            None => attempt.settings.topic.clone(),
        };
        table.add_row(vec![
            Cell::new(attempt.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(topic),
            Cell::new(attempt.settings.difficulty),
            Cell::new(format_score(result.score)),
            Cell::new(format!("{}/{}", result.correct_count, result.total())),
            Cell::new(format!("{:.1}%", result.percentage())),
            Cell::new(format_clock(result.elapsed_seconds)),
            Cell::new(if result.passed() { "passed" } else { "failed" }),
        ]);
    }
    println!("{table}");
    if shown < attempts.len() {
        println!("({} older attempt(s) not shown)", attempts.len() - shown);
    }

    let stats = HistoryStats::from_attempts(&attempts);
    let mut totals = Table::new();
    totals.set_header(vec!["Attempts", "Passed", "Average", "Best", "Questions", "Minutes"]);
    totals.add_row(vec![
        Cell::new(stats.total_attempts),
        Cell::new(stats.passed),
        Cell::new(format!("{:.1}%", stats.average_percentage)),
        Cell::new(format!("{:.1}%", stats.best_percentage)),
        Cell::new(format!("{}/{}", stats.total_correct, stats.total_questions)),
        Cell::new(stats.total_minutes()),
    ]);
    println!("\n{totals}");

    let by_difficulty: Vec<String> = stats
        .by_difficulty
        .iter()
        .map(|(difficulty, count)| format!("{difficulty}: {count}"))
        .collect();
    println!("By difficulty: {}", by_difficulty.join(", "));

    Ok(())
}
