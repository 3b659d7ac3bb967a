//! The `quizcraft take` command.
//!
//! Plays a quiz in the terminal. Input lines are read on a detached OS
//! thread and forwarded as session commands, so a timed-out session can
//! finish while that thread is still blocked on stdin.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tokio::sync::mpsc;

use quizcraft_core::error::SessionError;
use quizcraft_core::model::{Question, QuestionStatus, QuizSet};
use quizcraft_core::parser::parse_quiz_file;
use quizcraft_core::report::{AttemptReport, ATTEMPT_FILE_PREFIX};
use quizcraft_core::scoring::{format_clock, ResultRecord};
use quizcraft_core::session::{Command, QuizSession, SubmitReason};
use quizcraft_core::timer::{drive, IntervalTicks, SessionObserver};
use quizcraft_providers::config::load_config_from;
use quizcraft_report::html::{format_score, write_html_report};

/// Remaining-time marks that print a warning.
const TIME_WARNINGS: [u32; 2] = [60, 10];

pub struct TakeOptions {
    pub timer: Option<u32>,
    pub output: Option<PathBuf>,
    pub guest_name: Option<String>,
    pub no_save: bool,
    pub html: bool,
}

/// Console session observer.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_tick(&self, remaining_secs: u32) {
        if TIME_WARNINGS.contains(&remaining_secs) {
            println!("!! {} remaining", format_clock(remaining_secs));
        }
    }

    fn on_changed(&self, session: &QuizSession) {
        render_question(session);
    }

    fn on_rejected(&self, error: &SessionError) {
        eprintln!("  {error}");
    }

    fn on_submitted(&self, _: &ResultRecord, reason: SubmitReason) {
        match reason {
            SubmitReason::Timeout => println!("\nTime is up! Your answers were submitted."),
            SubmitReason::Manual => println!("\nSubmitted."),
        }
    }
}

/// What one line of user input means.
#[derive(Debug, PartialEq)]
enum Input {
    Command(Command),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim().to_ascii_lowercase();
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Input::Empty;
    };

    match head {
        "n" | "next" => Input::Command(Command::Next),
        "p" | "prev" | "previous" => Input::Command(Command::Previous),
        "r" | "review" => Input::Command(Command::ToggleReview),
        "s" | "submit" => Input::Command(Command::Submit),
        "q" | "quit" => Input::Quit,
        "?" | "h" | "help" => Input::Help,
        "g" | "goto" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n >= 1 => Input::Command(Command::GoTo(n - 1)),
            _ => Input::Unknown(line.clone()),
        },
        _ => {
            if let Ok(n) = head.parse::<usize>() {
                return match n {
                    0 => Input::Unknown(line.clone()),
                    n => Input::Command(Command::Select(n - 1)),
                };
            }
            let mut chars = head.chars();
            match (chars.next(), chars.next()) {
                (Some(c @ 'a'..='d'), None) => {
                    Input::Command(Command::Select(c as usize - 'a' as usize))
                }
                _ => Input::Unknown(line.clone()),
            }
        }
    }
}

fn print_help() {
    println!("  1-4 or a-d  select an option");
    println!("  n / p       next / previous question");
    println!("  g N         go to question N");
    println!("  r           toggle mark for review");
    println!("  s           submit");
    println!("  q           quit without saving");
}

/// Forward stdin lines to the session until EOF, `q`, or the session ends.
fn spawn_input_reader(commands: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_input(&line) {
                Input::Command(command) => {
                    if commands.blocking_send(command).is_err() {
                        break;
                    }
                }
                Input::Quit => break,
                Input::Help => print_help(),
                Input::Empty => {}
                Input::Unknown(input) => eprintln!("  unknown input '{input}', type ? for help"),
            }
        }
    });
}

fn render_question(session: &QuizSession) {
    let question = session.current_question();
    let answer = session.current_answer();
    let index = session.current_index();

    let navigator: String = session
        .statuses()
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let mark = match status {
                QuestionStatus::Answered => '#',
                QuestionStatus::Review => '?',
                QuestionStatus::Unanswered => '.',
            };
            if i == index {
                format!("[{mark}]")
            } else {
                format!(" {mark} ")
            }
        })
        .collect();

    println!();
    println!(
        "Question {}/{}  |  {} left  |  {}/{} answered",
        index + 1,
        session.questions().len(),
        format_clock(session.remaining_secs()),
        session.answered_count(),
        session.questions().len()
    );
    println!("{navigator}");
    if answer.marked_for_review {
        println!("(marked for review)");
    }
    println!("{}", question.text);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if answer.selected_option == Some(i) { '*' } else { ' ' };
        println!(" {marker} {}. {option}", Question::option_label(i));
    }
}

/// Load a quiz file, or the quiz inside a saved attempt.
fn load_quiz(path: &Path) -> Result<QuizSet> {
    let is_attempt = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(ATTEMPT_FILE_PREFIX) && name.ends_with(".json"));
    if is_attempt {
        Ok(AttemptReport::load_json(path)?.quiz())
    } else {
        parse_quiz_file(path)
    }
}

pub async fn execute(
    quiz_path: PathBuf,
    options: TakeOptions,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut set = load_quiz(&quiz_path)?;
    if let Some(minutes) = options.timer {
        set.settings = set.settings.with_timer_minutes(minutes);
    }
    let mut session = QuizSession::from_set(set)
        .with_context(|| format!("cannot start quiz {}", quiz_path.display()))?;

    let settings = session.settings();
    println!(
        "{} | {} | {} questions | {} minutes",
        settings.topic,
        settings.difficulty,
        session.questions().len(),
        settings.timer_minutes
    );
    if settings.negative_marking {
        println!(
            "Negative marking: {} per wrong answer",
            settings.penalty_per_wrong
        );
    }
    println!("Type ? for help.");
    render_question(&session);

    let (tx, mut rx) = mpsc::channel(16);
    spawn_input_reader(tx);

    let mut ticks = IntervalTicks::every_second();
    let Some(result) = drive(&mut session, &mut ticks, &mut rx, &ConsoleObserver).await else {
        println!("\nQuiz abandoned; nothing was saved.");
        return Ok(());
    };
    drop(ticks);

    print_result(&session, &result);

    if options.no_save {
        return Ok(());
    }

    let output_dir = match options.output {
        Some(dir) => dir,
        None => load_config_from(config_path.as_deref())?.output_dir,
    };
    let report = AttemptReport::from_session(&session, options.guest_name)
        .context("session finished without a result")?;
    let path = report.save_in(&output_dir)?;
    println!("Attempt saved to: {}", path.display());

    if options.html {
        let html_path = path.with_extension("html");
        write_html_report(&report, &html_path)?;
        println!("HTML report: {}", html_path.display());
    }

    Ok(())
}

fn print_result(session: &QuizSession, result: &ResultRecord) {
    let settings = session.settings();

    let mut summary = Table::new();
    summary.set_header(vec!["Score", "Percentage", "Correct", "Wrong", "Unanswered", "Time"]);
    summary.add_row(vec![
        Cell::new(format_score(result.score)),
        Cell::new(format!("{:.1}%", result.percentage())),
        Cell::new(result.correct_count),
        Cell::new(result.wrong_count),
        Cell::new(result.unanswered_count),
        Cell::new(format_clock(result.elapsed_seconds)),
    ]);
    println!("\n{summary}");
    println!("Grade: {}", result.grade());

    let mut review = Table::new();
    review.set_header(vec!["#", "Your answer", "Correct", "Result"]);
    for (i, outcome) in result.per_question.iter().enumerate() {
        let verdict = match outcome.selected {
            None => "unanswered",
            Some(_) if outcome.is_correct => "correct",
            Some(_) => "wrong",
        };
        let flag = if outcome.marked_for_review { " (review)" } else { "" };
        review.add_row(vec![
            Cell::new(format!("{}{flag}", i + 1)),
            Cell::new(
                outcome
                    .selected
                    .map(|o| Question::option_label(o).to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(Question::option_label(outcome.correct)),
            Cell::new(verdict),
        ]);
    }
    println!("{review}");

    for (i, (question, outcome)) in session
        .questions()
        .iter()
        .zip(&result.per_question)
        .enumerate()
    {
        println!("\n{}. {}", i + 1, question.text);
        if let Some(answer) = question.options.get(outcome.correct) {
            println!(
                "   Answer: {}. {answer}",
                Question::option_label(outcome.correct)
            );
        }
        if !question.explanation.is_empty() {
            println!("   {}", question.explanation);
        }
    }

    println!("\n{}", result.share_text(&settings.topic));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_input() {
        assert_eq!(parse_input("2"), Input::Command(Command::Select(1)));
        assert_eq!(parse_input(" C "), Input::Command(Command::Select(2)));
        assert_eq!(parse_input("7"), Input::Command(Command::Select(6)));
        assert!(matches!(parse_input("0"), Input::Unknown(_)));
    }

    #[test]
    fn navigation_input() {
        assert_eq!(parse_input("n"), Input::Command(Command::Next));
        assert_eq!(parse_input("prev"), Input::Command(Command::Previous));
        assert_eq!(parse_input("g 3"), Input::Command(Command::GoTo(2)));
        assert!(matches!(parse_input("g"), Input::Unknown(_)));
        assert_eq!(parse_input("r"), Input::Command(Command::ToggleReview));
    }

    #[test]
    fn control_input() {
        assert_eq!(parse_input("s"), Input::Command(Command::Submit));
        assert_eq!(parse_input("q"), Input::Quit);
        assert_eq!(parse_input("?"), Input::Help);
        assert_eq!(parse_input("h"), Input::Help);
        assert_eq!(parse_input("   "), Input::Empty);
        assert!(matches!(parse_input("launch"), Input::Unknown(_)));
    }
}
