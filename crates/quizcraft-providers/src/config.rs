//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizcraft_core::traits::QuestionProvider;

use crate::anthropic::AnthropicProvider;
use crate::mock::MockProvider;
use crate::openai::OpenAiProvider;

/// An API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Configuration for a single LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: ApiKey,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: ApiKey,
        #[serde(default)]
        base_url: Option<String>,
    },
    /// Offline placeholder questions.
    Mock,
}

impl ProviderConfig {
    /// Replace `${VAR}` references in every string field.
    fn resolve_env(&mut self) {
        match self {
            ProviderConfig::OpenAI {
                api_key,
                base_url,
                org_id,
            } => {
                api_key.0 = resolve_env_vars(&api_key.0);
                for field in [base_url, org_id].into_iter().flatten() {
                    *field = resolve_env_vars(field);
                }
            }
            ProviderConfig::Anthropic { api_key, base_url } => {
                api_key.0 = resolve_env_vars(&api_key.0);
                if let Some(url) = base_url {
                    *url = resolve_env_vars(url);
                }
            }
            ProviderConfig::Mock => {}
        }
    }

    /// Provider entry created when only an environment key is available.
    fn hosted(kind: &str, key: ApiKey) -> Option<Self> {
        match kind {
            "openai" => Some(ProviderConfig::OpenAI {
                api_key: key,
                base_url: None,
                org_id: None,
            }),
            "anthropic" => Some(ProviderConfig::Anthropic {
                api_key: key,
                base_url: None,
            }),
            _ => None,
        }
    }
}

/// Environment variables that override the key of a named provider.
const KEY_OVERRIDES: [(&str, &str); 2] = [
    ("openai", "QUIZCRAFT_OPENAI_KEY"),
    ("anthropic", "QUIZCRAFT_ANTHROPIC_KEY"),
];

/// Top-level quizcraft configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizcraftConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for question generation.
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Max retries on provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay between retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Directory for saved quizzes and attempts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizcraft-results")
}

impl Default for QuizcraftConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            output_dir: default_output_dir(),
        }
    }
}

/// Substitute `${VAR}` references with environment values (unset variables
/// become empty). Substituted text is never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut resolved = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        resolved.push_str(&rest[..start]);
        let name = &rest[start + 2..start + 2 + len];
        resolved.push_str(&std::env::var(name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    resolved.push_str(rest);
    resolved
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizcraft.toml` in the current directory
/// 2. `~/.config/quizcraft/config.toml`
///
/// Environment variable overrides: `QUIZCRAFT_OPENAI_KEY`, `QUIZCRAFT_ANTHROPIC_KEY`.
pub fn load_config() -> Result<QuizcraftConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizcraftConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizcraft.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config(&path)?
        }
        None => QuizcraftConfig::default(),
    };

    for (name, var) in KEY_OVERRIDES {
        let Ok(key) = std::env::var(var) else {
            continue;
        };
        apply_key_override(&mut config, name, ApiKey::new(key));
    }

    for provider in config.providers.values_mut() {
        provider.resolve_env();
    }

    Ok(config)
}

/// Set the key of provider `name`, adding an entry if it is missing.
fn apply_key_override(config: &mut QuizcraftConfig, name: &str, key: ApiKey) {
    match config.providers.get_mut(name) {
        Some(ProviderConfig::OpenAI { api_key, .. } | ProviderConfig::Anthropic { api_key, .. }) => {
            *api_key = key;
        }
        Some(ProviderConfig::Mock) => {
            tracing::warn!(provider = name, "ignoring API key override for a mock provider");
        }
        None => {
            if let Some(provider) = ProviderConfig::hosted(name, key) {
                config.providers.insert(name.to_string(), provider);
            }
        }
    }
}

fn parse_config(path: &Path) -> Result<QuizcraftConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<QuizcraftConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizcraft"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn QuestionProvider>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiProvider::new(
            api_key.expose(),
            base_url.clone(),
            org_id.clone(),
        )?)),
        ProviderConfig::Anthropic { api_key, base_url } => Ok(Box::new(AnthropicProvider::new(
            api_key.expose(),
            base_url.clone(),
        )?)),
        ProviderConfig::Mock => Ok(Box::new(MockProvider::new())),
    }
}
