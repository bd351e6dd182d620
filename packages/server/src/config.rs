use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dotenvy::dotenv;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 7777;
pub const DEFAULT_PIPELINE_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_CAPTURE_FILE: &str = "captured_tabs.jsonl";
pub const DEFAULT_TAG_LIBRARY: &str = "tag_library.md";
pub const PIPELINE_BIN_NAME: &str = "summarize";

/// Fatal configuration problems, reported before any item is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingCredential(&'static str),

    #[error("{0} must be set")]
    MissingPath(&'static str),

    #[error("{var} does not exist: {}", path.display())]
    NotFound { var: &'static str, path: PathBuf },

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Load `.env` if present (development).
pub fn load_dotenv() {
    let _ = dotenv();
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match non_empty(value) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}

/// `~/captured_tabs.jsonl`, unless overridden.
fn capture_file(value: Option<String>) -> Result<PathBuf, ConfigError> {
    match non_empty(value) {
        Some(path) => Ok(expand_home(&path)),
        None => dirs::home_dir()
            .map(|home| home.join(DEFAULT_CAPTURE_FILE))
            .ok_or(ConfigError::MissingPath("CAPTURED_TABS_FILE")),
    }
}

/// Expand a leading `~/`.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Control surface configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub capture_file: PathBuf,
    pub pipeline_timeout: Duration,
    pub pipeline_bin: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs = parse_var(
            "PIPELINE_TIMEOUT_SECS",
            lookup("PIPELINE_TIMEOUT_SECS"),
            DEFAULT_PIPELINE_TIMEOUT_SECS,
        )?;

        Ok(Self {
            port: parse_var("PORT", lookup("PORT"), DEFAULT_PORT)?,
            capture_file: capture_file(lookup("CAPTURED_TABS_FILE"))?,
            pipeline_timeout: Duration::from_secs(timeout_secs),
            pipeline_bin: non_empty(lookup("PIPELINE_BIN"))
                .map(|p| expand_home(&p))
                .unwrap_or_else(default_pipeline_bin),
        })
    }
}

/// The `summarize` binary next to the running executable, else from `PATH`.
pub fn default_pipeline_bin() -> PathBuf {
    let name = format!("{}{}", PIPELINE_BIN_NAME, env::consts::EXE_SUFFIX);
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Unvalidated pipeline settings, from flags or environment.
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub api_key: Option<String>,
    pub vault_path: Option<String>,
    pub capture_file: Option<String>,
    pub tag_library: Option<String>,
    pub model: Option<String>,
}

impl PipelineSettings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup("ANTHROPIC_API_KEY"),
            vault_path: lookup("VAULT_PATH"),
            capture_file: lookup("CAPTURED_TABS_FILE"),
            tag_library: lookup("TAG_LIBRARY_PATH"),
            model: lookup("SUMMARY_MODEL"),
        }
    }
}

/// Validated configuration for one pipeline invocation
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: String,
    pub vault_path: PathBuf,
    pub capture_file: PathBuf,
    /// `None` when no vocabulary file is configured or found.
    pub tag_library: Option<PathBuf>,
    pub model: String,
}

impl PipelineConfig {
    /// Validate settings: the credential must be present and the vault must
    /// be an existing directory.
    pub fn from_settings(settings: PipelineSettings) -> Result<Self, ConfigError> {
        let api_key = non_empty(settings.api_key)
            .ok_or(ConfigError::MissingCredential("ANTHROPIC_API_KEY"))?;

        let vault_path = non_empty(settings.vault_path)
            .map(|p| expand_home(&p))
            .ok_or(ConfigError::MissingPath("VAULT_PATH"))?;
        if !vault_path.is_dir() {
            return Err(ConfigError::NotFound {
                var: "VAULT_PATH",
                path: vault_path,
            });
        }

        let tag_library = match non_empty(settings.tag_library) {
            Some(path) => Some(expand_home(&path)),
            None => default_tag_library(&vault_path),
        };

        Ok(Self {
            api_key,
            capture_file: capture_file(settings.capture_file)?,
            tag_library,
            model: non_empty(settings.model)
                .unwrap_or_else(|| pipeline::ai::DEFAULT_MODEL.to_string()),
            vault_path,
        })
    }
}

fn default_tag_library(vault_path: &Path) -> Option<PathBuf> {
    let candidate = vault_path.join(DEFAULT_TAG_LIBRARY);
    candidate.is_file().then_some(candidate)
}
