//! HTML results page.
//!
//! Produces a self-contained HTML file with all CSS inlined: the score
//! summary followed by the detailed per-question review.

use anyhow::{Context, Result};
use std::path::Path;

use quizcraft_core::model::Question;
use quizcraft_core::report::AttemptReport;
use quizcraft_core::scoring::{format_clock, Grade, QuestionOutcome, ResultRecord};
use quizcraft_core::session::SubmitReason;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the results page for a finished attempt.
pub fn generate_html(report: &AttemptReport) -> String {
    let settings = &report.settings;
    let result = &report.result;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizcraft results: {}</title>\n",
        html_escape(&settings.topic)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&settings.topic)));
    let taker = report
        .guest_name
        .as_deref()
        .map(|name| format!(" | taken by <strong>{}</strong>", html_escape(name)))
        .unwrap_or_default();
    html.push_str(&format!(
        "<p class=\"meta\">{} difficulty | {} questions | {}{}</p>\n",
        settings.difficulty,
        result.total(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        taker
    ));
    if report.submit_reason == SubmitReason::Timeout {
        html.push_str("<p class=\"notice\">Time ran out; the quiz was submitted automatically.</p>\n");
    }
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&format!(
        "<p class=\"score {}\">{:.1}%</p>\n",
        grade_class(result.grade()),
        result.percentage()
    ));
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    let score_label = if settings.negative_marking {
        format!(
            "{} (penalty {} per wrong answer)",
            format_score(result.score),
            settings.penalty_per_wrong
        )
    } else {
        format_score(result.score)
    };
    let rows = [
        ("Score", score_label),
        ("Correct", result.correct_count.to_string()),
        ("Wrong", result.wrong_count.to_string()),
        ("Unanswered", result.unanswered_count.to_string()),
        (
            "Time taken",
            format!(
                "{} of {}",
                format_clock(result.elapsed_seconds),
                format_clock(settings.time_limit_secs())
            ),
        ),
    ];
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><th>{label}</th><td>{}</td></tr>\n",
            html_escape(&value)
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str(&generate_breakdown_bar(result));
    html.push_str("</section>\n");

    // Detailed review
    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Review</h2>\n");
    for (i, (question, outcome)) in report
        .questions
        .iter()
        .zip(&result.per_question)
        .enumerate()
    {
        html.push_str(&review_item(i, question, outcome));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the results page to a file.
pub fn write_html_report(report: &AttemptReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn review_item(index: usize, question: &Question, outcome: &QuestionOutcome) -> String {
    let status = match outcome.selected {
        None => "unanswered",
        Some(_) if outcome.is_correct => "pass",
        Some(_) => "fail",
    };

    let mut item = format!(
        "<article class=\"question {status}\">\n<h3>{}. {}</h3>\n",
        index + 1,
        html_escape(&question.text)
    );
    if outcome.marked_for_review {
        item.push_str("<p class=\"flag\">Marked for review</p>\n");
    }

    item.push_str("<ol class=\"options\">\n");
    for (o, option) in question.options.iter().enumerate() {
        let mut classes = Vec::new();
        let mut tags = Vec::new();
        if o == outcome.correct {
            classes.push("correct");
            tags.push("correct answer");
        }
        if outcome.selected == Some(o) {
            classes.push("selected");
            tags.push("your answer");
        }
        let suffix = if tags.is_empty() {
            String::new()
        } else {
            format!(" <em>({})</em>", tags.join(", "))
        };
        item.push_str(&format!(
            "<li class=\"{}\"><b>{}.</b> {}{}</li>\n",
            classes.join(" "),
            Question::option_label(o),
            html_escape(option),
            suffix
        ));
    }
    item.push_str("</ol>\n");

    if !question.explanation.is_empty() {
        item.push_str(&format!(
            "<p class=\"explanation\">{}</p>\n",
            html_escape(&question.explanation)
        ));
    }
    item.push_str("</article>\n");
    item
}

/// Stacked bar of correct / wrong / unanswered.
fn generate_breakdown_bar(result: &ResultRecord) -> String {
    let total = result.total().max(1) as f64;
    let max_width = 400.0;
    let height = 24;

    let segments = [
        (result.correct_count, "#22c55e"),
        (result.wrong_count, "#ef4444"),
        (result.unanswered_count, "#9ca3af"),
    ];

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        max_width as usize, height
    );
    let mut x = 0.0;
    for (count, color) in segments {
        if count == 0 {
            continue;
        }
        let width = count as f64 / total * max_width;
        svg.push_str(&format!(
            "  <rect x=\"{x:.1}\" y=\"0\" width=\"{width:.1}\" height=\"{height}\" fill=\"{color}\"/>\n"
        ));
        x += width;
    }
    svg.push_str("</svg>\n");
    svg
}

fn grade_class(grade: Grade) -> &'static str {
    match grade {
        Grade::Excellent => "pass",
        Grade::Good => "warn",
        Grade::NeedsWork => "fail",
    }
}

/// Whole scores without decimals, fractional ones with two.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.2}")
    }
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --warn: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --warn: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 56rem; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.notice { font-weight: bold; }
.score { font-size: 3rem; font-weight: bold; margin: 0.5rem 0; padding: 0.5rem 1rem; border-radius: 8px; display: inline-block; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.warn { background: var(--warn); }
.question { border: 1px solid var(--border); border-radius: 8px; padding: 0 1rem 1rem; margin: 1rem 0; }
.question.unanswered { background: transparent; }
.options li { padding: 0.25rem 0; }
.options li.correct { font-weight: bold; }
.options li.selected:not(.correct) { text-decoration: line-through; }
.explanation { font-style: italic; }
.flag { color: #ca8a04; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quizcraft_core::model::{Difficulty, QuizSettings};
    use quizcraft_core::session::QuizSession;

    fn make_test_report() -> AttemptReport {
        let questions = vec![
            Question {
                id: 1,
                text: "Which tag starts an HTML document?".into(),
                options: vec![
                    "<html>".into(),
                    "<head>".into(),
                    "<body>".into(),
                    "<div>".into(),
                ],
                correct_option: 0,
                explanation: "The <html> element is the root.".into(),
            },
            Question {
                id: 2,
                text: "What does CSS stand for?".into(),
                options: vec![
                    "Cascading Style Sheets".into(),
                    "Computer Style Sheets".into(),
                    "Creative Style System".into(),
                    "Colorful Style Sheets".into(),
                ],
                correct_option: 0,
                explanation: "Cascading Style Sheets.".into(),
            },
            Question {
                id: 3,
                text: "Which attribute sets alternate text?".into(),
                options: vec!["title".into(), "alt".into(), "src".into(), "href".into()],
                correct_option: 1,
                explanation: String::new(),
            },
        ];
        let settings = QuizSettings::new("Web basics", Difficulty::Easy, 3)
            .with_negative_marking(-0.25);

        let mut session = QuizSession::start(questions, settings).unwrap();
        session.select_option(0).unwrap();
        session.next();
        session.select_option(2).unwrap();
        session.toggle_review();
        for _ in 0..75 {
            session.tick();
        }
        session.submit();
        AttemptReport::from_session(&session, Some("Robin".into())).unwrap()
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Web basics"));
        assert!(html.contains("Robin"));
        assert!(html.contains("33.3%"));
        assert!(html.contains("0.75 (penalty -0.25 per wrong answer)"));
        assert!(html.contains("1:15 of 3:00"));
        assert!(html.contains("Marked for review"));
        assert!(html.contains("Cascading Style Sheets."));
    }

    #[test]
    fn question_text_is_escaped() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("&lt;html&gt;"));
        assert!(!html.contains("<li class=\"correct selected\"><b>A.</b> <html>"));
    }

    #[test]
    fn review_marks_selected_and_correct_options() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("class=\"correct selected\""));
        assert!(html.contains("<em>(your answer)</em>"));
        assert!(html.contains("<article class=\"question unanswered\">"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.html");

        write_html_report(&report, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(6.0), "6");
        assert_eq!(format_score(5.25), "5.25");
        assert_eq!(format_score(-0.75), "-0.75");
    }
}
