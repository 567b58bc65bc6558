//! Credential loading from an optional `.env` file and the process
//! environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::config::runtime_paths;

/// Credentials keyed by variable name.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a credential value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Returns a required credential or an error when missing or blank.
    ///
    /// # Errors
    ///
    /// Returns an error when the key does not exist in loaded credentials.
    pub fn require(&self, key: &str) -> anyhow::Result<String> {
        self.vars
            .get(key)
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing required credential: {key}"))
    }

    /// Set a value, replacing any earlier one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Overlay the named process environment variables on top of the
    /// loaded values.
    pub fn overlay_env<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            if let Ok(value) = std::env::var(key) {
                self.vars.insert(key.to_owned(), value);
            }
        }
    }
}

/// Load credentials from a specific `.env` path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    let mut vars = BTreeMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read credentials at {}", path.display()))?;

    for item in iter {
        let (key, value) = item.with_context(|| {
            format!(
                "failed to parse key-value entry in credentials file {}",
                path.display()
            )
        })?;
        vars.insert(key, value);
    }

    Ok(Credentials { vars })
}

/// `.env` file read from the working directory.
pub const LOCAL_ENV_FILE: &str = ".env";

/// Load each existing file in `files`, later files overriding earlier ones,
/// then overlay `keys` from the process environment.
///
/// # Errors
///
/// Returns an error when an existing file cannot be read or parsed.
pub fn load_layered_credentials<'a, P: AsRef<Path>>(
    files: &[P],
    keys: impl IntoIterator<Item = &'a str>,
) -> anyhow::Result<Credentials> {
    let mut credentials = Credentials::default();
    for path in files.iter().map(AsRef::as_ref).filter(|path| path.is_file()) {
        let layer = load_credentials(path)?;
        debug!(path = %path.display(), keys = layer.vars.len(), "loaded credentials file");
        credentials.vars.extend(layer.vars);
    }
    credentials.overlay_env(keys);
    Ok(credentials)
}

/// Load `~/.persona-card/.env`, then `./.env`, then overlay `keys` from the
/// process environment. Missing files are skipped.
///
/// # Errors
///
/// Returns an error when a credentials file exists but is invalid.
pub fn load_default_credentials<'a>(
    keys: impl IntoIterator<Item = &'a str>,
) -> anyhow::Result<Credentials> {
    let mut files = Vec::with_capacity(2);
    if let Ok(paths) = runtime_paths() {
        files.push(paths.env_file);
    }
    files.push(PathBuf::from(LOCAL_ENV_FILE));
    load_layered_credentials(&files, keys)
}
