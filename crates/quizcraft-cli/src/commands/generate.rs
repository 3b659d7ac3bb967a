//! The `quizcraft generate` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use quizcraft_core::generator::{GeneratorConfig, QuizGenerator};
use quizcraft_core::model::{Difficulty, QuizSettings};
use quizcraft_core::parser::save_quiz_file;
use quizcraft_core::traits::QuestionProvider;
use quizcraft_providers::config::load_config_from;
use quizcraft_providers::create_provider;

pub struct GenerateOptions {
    pub topic: String,
    pub questions: u32,
    pub difficulty: Difficulty,
    pub negative_marking: bool,
    pub penalty: f64,
    pub timer: Option<u32>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
}

pub async fn execute(options: GenerateOptions, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut settings = QuizSettings::new(&options.topic, options.difficulty, options.questions);
    if options.negative_marking {
        settings = settings.with_negative_marking(options.penalty);
    }
    if let Some(minutes) = options.timer {
        settings = settings.with_timer_minutes(minutes);
    }
    settings.validate()?;
    tracing::debug!(?settings, "resolved quiz settings");

    let provider_name = options
        .provider
        .unwrap_or_else(|| config.default_provider.clone());
    let provider: Arc<dyn QuestionProvider> = match config.providers.get(&provider_name) {
        Some(provider_config) => Arc::from(create_provider(provider_config)?),
        None => anyhow::bail!(
            "provider '{}' not found in config. Available: {:?}",
            provider_name,
            config.providers.keys().collect::<Vec<_>>()
        ),
    };

    let generator_config = GeneratorConfig {
        model: options
            .model
            .unwrap_or_else(|| config.default_model.clone()),
        temperature: config.default_temperature,
        max_retries: config.max_retries,
        retry_delay: Duration::from_millis(config.retry_delay_ms),
        system_prompt_override: None,
    };

    eprintln!(
        "Generating {} {} questions about \"{}\" with {provider_name}...",
        settings.total_questions, settings.difficulty, settings.topic
    );

    let generator = QuizGenerator::new(provider, generator_config);
    let set = generator.generate(&settings).await?;

    let path = options.output.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        config
            .output_dir
            .join(format!("quiz-{}-{timestamp}.toml", slug(&settings.topic)))
    });
    save_quiz_file(&set, &path)?;

    println!(
        "Saved {} questions to {} ({} minute limit)",
        set.questions.len(),
        path.display(),
        set.settings.timer_minutes
    );
    println!("Run: quizcraft take --quiz {}", path.display());

    Ok(())
}

/// Lowercase ASCII slug for file names.
fn slug(topic: &str) -> String {
    let slug = topic
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "quiz".to_string()
    } else {
        slug
    }
}
