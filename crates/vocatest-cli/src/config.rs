//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the config file looked up in the current directory.
pub const LOCAL_CONFIG: &str = "vocatest.toml";

/// Top-level vocatest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocatestConfig {
    /// Question bank TOML file.
    #[serde(default = "default_question_bank")]
    pub question_bank: PathBuf,
    /// JSON Lines file finished tests are appended to.
    #[serde(default = "default_results_file")]
    pub results_file: PathBuf,
    /// Fixed selection seed; random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_question_bank() -> PathBuf {
    PathBuf::from("vocatest/questions.toml")
}
fn default_results_file() -> PathBuf {
    PathBuf::from("vocabulary_test_results.jsonl")
}

impl Default for VocatestConfig {
    fn default() -> Self {
        Self {
            question_bank: default_question_bank(),
            results_file: default_results_file(),
            seed: None,
        }
    }
}

/// Expand `${VAR}` references in a string. Unset variables expand to nothing.
///
/// Substituted values are copied as-is and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + 2 + len];
        out.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `vocatest.toml` in the current directory
/// 2. `~/.config/vocatest/config.toml`
///
/// Falls back to defaults when neither exists.
pub fn load_config_from(path: Option<&Path>) -> Result<VocatestConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(LOCAL_CONFIG);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<VocatestConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => VocatestConfig::default(),
    };

    config.question_bank = resolve_path(&config.question_bank);
    config.results_file = resolve_path(&config.results_file);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("vocatest"))
}
