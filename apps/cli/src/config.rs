//! CLI configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `$XDG_CONFIG_HOME/tusk/config.toml` (or `~/.config/tusk/config.toml`)
//! - Windows: `%APPDATA%/tusk/config.toml`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Uploader configuration. Command-line flags override every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Creation endpoint used when `--endpoint` is not given.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Maximum bytes per PATCH (unset = whole remainder).
    #[serde(default)]
    pub chunk_size: Option<u64>,

    /// Look up and record upload URLs so interrupted uploads resume.
    #[serde(default = "default_true")]
    pub resume: bool,

    /// Forget the stored URL once an upload completes.
    #[serde(default)]
    pub remove_fingerprint_on_success: bool,

    /// Upload URL store file (defaults next to this config).
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Connection timeout in seconds (0 = none).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds, body upload included (0 = none).
    /// Pair a non-zero value with `chunk_size` or large chunks time out.
    #[serde(default)]
    pub request_timeout_secs: u64,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            chunk_size: None,
            resume: default_true(),
            remove_fingerprint_on_success: false,
            store_path: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: 0,
            log_level: default_log_level(),
            headers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or defaults if the file is missing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Headers may carry credentials.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Connect and whole-request timeouts, `None` when disabled.
    pub fn timeouts(&self) -> (Option<Duration>, Option<Duration>) {
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        (secs(self.connect_timeout_secs), secs(self.request_timeout_secs))
    }

    /// Resolves the store file path.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        match &self.store_path {
            Some(p) => Ok(p.clone()),
            None => tusk_store::default_store_path()
                .context("cannot determine config directory; set store_path"),
        }
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    tusk_store::config_dir()
        .map(|d| d.join("tusk").join("config.toml"))
        .context("cannot determine config directory; pass --config")
}
