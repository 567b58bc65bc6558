//! Configuration loading.
//!
//! Everything is optional: a missing `config.toml` means defaults, and every
//! table and key falls back to its default when omitted.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::render::RenderConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language model selection.
    pub models: ModelsConfig,
    /// Reddit fetch settings.
    pub reddit: RedditConfig,
    /// Persona image layout.
    pub render: RenderConfig,
    /// Where output files are written.
    pub output: OutputConfig,
}

/// Language model selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Model spec as `<provider>/<model>` (e.g. "groq/llama3-70b-8192").
    pub default: String,
    /// Maximum tokens in the generated persona.
    pub max_tokens: u32,
    /// Credential variable holding the provider API key.
    pub api_key_env: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            default: default_model(),
            max_tokens: default_max_tokens(),
            api_key_env: "GROQ_API_KEY".to_owned(),
        }
    }
}

/// Reddit fetch settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    /// `User-Agent` sent with every Reddit request.
    pub user_agent: String,
    /// Number of newest submissions to read.
    pub post_limit: u32,
    /// Number of newest comments to read.
    pub comment_limit: u32,
    /// Credential variable holding the app client id.
    pub client_id_env: String,
    /// Credential variable holding the app client secret.
    pub client_secret_env: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("persona-card/{}", env!("CARGO_PKG_VERSION")),
            post_limit: default_listing_limit(),
            comment_limit: default_listing_limit(),
            client_id_env: "REDDIT_CLIENT_ID".to_owned(),
            client_secret_env: "REDDIT_CLIENT_SECRET".to_owned(),
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `persona_<user>.txt` and `.png`.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

// Default value functions for serde

fn default_model() -> String {
    "groq/llama3-70b-8192".to_owned()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_listing_limit() -> u32 {
    50
}

/// Resolved filesystem locations.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Root directory (`~/.persona-card`).
    pub root: PathBuf,
    /// Default configuration file.
    pub config_toml: PathBuf,
    /// Credentials file.
    pub env_file: PathBuf,
    /// Directory for JSON log files.
    pub logs_dir: PathBuf,
}

/// Resolve the default config directory (`~/.persona-card/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".persona-card"))
}

/// Resolve all runtime paths under [`config_dir`].
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn runtime_paths() -> anyhow::Result<RuntimePaths> {
    let root = config_dir()?;
    Ok(RuntimePaths {
        config_toml: root.join("config.toml"),
        env_file: root.join(".env"),
        logs_dir: root.join("logs"),
        root,
    })
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

/// Load `~/.persona-card/config.toml`, or defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_config() -> anyhow::Result<Config> {
    let paths = runtime_paths()?;
    if !paths.config_toml.exists() {
        tracing::debug!(path = %paths.config_toml.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load_config(&paths.config_toml)
}
