//! The `quizcraft report` command.

use std::path::PathBuf;

use anyhow::Result;

use quizcraft_core::report::AttemptReport;
use quizcraft_report::html::write_html_report;

pub fn execute(attempt_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let report = AttemptReport::load_json(&attempt_path)?;
    let path = output.unwrap_or_else(|| attempt_path.with_extension("html"));

    write_html_report(&report, &path)?;
    println!("HTML report: {}", path.display());
    Ok(())
}
