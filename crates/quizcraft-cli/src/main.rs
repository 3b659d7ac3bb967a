//! The `quizcraft` binary: generate quizzes and take them in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use quizcraft_core::model::Difficulty;

mod commands;

#[derive(Parser)]
#[command(name = "quizcraft", version, about = "AI-generated quizzes in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz with an LLM provider
    Generate {
        /// Quiz topic
        #[arg(long)]
        topic: String,

        /// Number of questions (1-50)
        #[arg(long, default_value = "10")]
        questions: u32,

        /// Difficulty: easy, medium, hard, mix
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,

        /// Subtract a penalty for each wrong answer
        #[arg(long)]
        negative_marking: bool,

        /// Penalty per wrong answer when negative marking is on
        #[arg(long, default_value = "-0.25", allow_negative_numbers = true)]
        penalty: f64,

        /// Time limit in minutes (default: one per question)
        #[arg(long)]
        timer: Option<u32>,

        /// Provider name from the config file
        #[arg(long)]
        provider: Option<String>,

        /// Model to request
        #[arg(long)]
        model: Option<String>,

        /// Output quiz file (.toml or .json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take a quiz interactively
    Take {
        /// Quiz file (.toml/.json) or a saved attempt to retake
        #[arg(long)]
        quiz: PathBuf,

        /// Override the time limit in minutes
        #[arg(long)]
        timer: Option<u32>,

        /// Directory for the attempt report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Name shown on the attempt report
        #[arg(long)]
        guest_name: Option<String>,

        /// Do not save the attempt
        #[arg(long)]
        no_save: bool,

        /// Also write an HTML results page
        #[arg(long, conflicts_with = "no_save")]
        html: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Show saved attempts and totals
    History {
        /// Directory containing attempt reports
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Show only the most recent N attempts
        #[arg(long)]
        limit: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render a saved attempt as an HTML page
    Report {
        /// Attempt report JSON
        #[arg(long)]
        attempt: PathBuf,

        /// Output HTML file (default: next to the attempt)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "quizcraft=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            topic,
            questions,
            difficulty,
            negative_marking,
            penalty,
            timer,
            provider,
            model,
            output,
            config,
        } => {
            let options = commands::generate::GenerateOptions {
                topic,
                questions,
                difficulty,
                negative_marking,
                penalty,
                timer,
                provider,
                model,
                output,
            };
            commands::generate::execute(options, config).await
        }
        Commands::Take {
            quiz,
            timer,
            output,
            guest_name,
            no_save,
            html,
            config,
        } => {
            let options = commands::take::TakeOptions {
                timer,
                output,
                guest_name,
                no_save,
                html,
            };
            commands::take::execute(quiz, options, config).await
        }
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::History { dir, limit, config } => commands::history::execute(dir, limit, config),
        Commands::Report { attempt, output } => commands::report::execute(attempt, output),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
