//! Judge configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizmark_core::judge::Judge;

use crate::anthropic::AnthropicJudge;
use crate::ollama::OllamaJudge;
use crate::openai::OpenAiJudge;

/// Configuration for a single judge backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JudgeConfig {
    OpenAi {
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
}

impl std::fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JudgeConfig::OpenAi {
                api_key: _,
                model,
                base_url,
            } => f
                .debug_struct("OpenAi")
                .field("api_key", &"***")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            JudgeConfig::Anthropic {
                api_key: _,
                model,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            JudgeConfig::Ollama { base_url, model } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

/// Top-level quizmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Judge configurations keyed by name.
    #[serde(default)]
    pub judges: HashMap<String, JudgeConfig>,
    /// The judge used for free-text grading.
    #[serde(default = "default_judge")]
    pub judge: String,
    /// Language for explanations and expected answers, passed verbatim into
    /// the grading prompt.
    #[serde(default = "default_language")]
    pub language: String,
    /// Folder scanned for quiz files.
    #[serde(default = "default_quiz_dir")]
    pub quiz_dir: PathBuf,
}

fn default_judge() -> String {
    "openai".to_string()
}

fn default_language() -> String {
    "Fran\u{e7}ais".to_string()
}

fn default_quiz_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            judges: HashMap::new(),
            judge: default_judge(),
            language: default_language(),
            quiz_dir: default_quiz_dir(),
        }
    }
}

impl QuizmarkConfig {
    /// The configuration of the selected judge.
    pub fn selected_judge(&self) -> Result<&JudgeConfig> {
        self.judges.get(&self.judge).with_context(|| {
            format!(
                "judge '{}' is not configured; add a [judges.{}] section",
                self.judge, self.judge
            )
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a judge config.
fn resolve_judge_config(config: &JudgeConfig) -> JudgeConfig {
    match config {
        JudgeConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => JudgeConfig::OpenAi {
            api_key: resolve_env_vars(api_key),
            model: model.clone(),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        JudgeConfig::Anthropic {
            api_key,
            model,
            base_url,
        } => JudgeConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            model: model.clone(),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        JudgeConfig::Ollama { base_url, model } => JudgeConfig::Ollama {
            base_url: resolve_env_vars(base_url),
            model: model.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizmark.toml` in the current directory
/// 2. `~/.config/quizmark/config.toml`
///
/// Environment variable overrides: `QUIZMARK_OPENAI_KEY`, `QUIZMARK_ANTHROPIC_KEY`.
pub fn load_config() -> Result<QuizmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizmark.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizmarkConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("QUIZMARK_OPENAI_KEY") {
        config
            .judges
            .entry("openai".into())
            .or_insert(JudgeConfig::OpenAi {
                api_key: String::new(),
                model: default_openai_model(),
                base_url: None,
            });
        if let Some(JudgeConfig::OpenAi { api_key, .. }) = config.judges.get_mut("openai") {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("QUIZMARK_ANTHROPIC_KEY") {
        config
            .judges
            .entry("anthropic".into())
            .or_insert(JudgeConfig::Anthropic {
                api_key: String::new(),
                model: default_anthropic_model(),
                base_url: None,
            });
        if let Some(JudgeConfig::Anthropic { api_key, .. }) = config.judges.get_mut("anthropic") {
            *api_key = key;
        }
    }

    // Resolve env vars in all judge configs
    let resolved: HashMap<String, JudgeConfig> = config
        .judges
        .iter()
        .map(|(k, v)| (k.clone(), resolve_judge_config(v)))
        .collect();
    config.judges = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}

/// Create a judge instance from its configuration.
pub fn create_judge(config: &JudgeConfig) -> Box<dyn Judge> {
    match config {
        JudgeConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => Box::new(OpenAiJudge::new(api_key, model, base_url.clone())),
        JudgeConfig::Anthropic {
            api_key,
            model,
            base_url,
        } => Box::new(AnthropicJudge::new(api_key, model, base_url.clone())),
        JudgeConfig::Ollama { base_url, model } => Box::new(OllamaJudge::new(base_url, model)),
    }
}
