//! CLI configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/largeattach/config.toml`
//! - Windows: `%APPDATA%/largeattach/config.toml`

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `access_token`.
pub const TOKEN_ENV: &str = "LARGEATTACH_ACCESS_TOKEN";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Mailbox owner: object id or user principal name.
    #[serde(default)]
    pub user_id: String,

    /// Pre-acquired bearer token for the mailbox API.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,

    /// Mailbox API root.
    #[serde(default = "default_base_url")]
    pub graph_base_url: String,

    /// Bytes per slice (multiple of 327680).
    #[serde(default = "default_slice_size")]
    pub slice_size: u64,

    /// Timeout for a single slice request, in seconds.
    #[serde(default = "default_slice_timeout")]
    pub slice_timeout_secs: u64,

    /// Message defaults.
    #[serde(default)]
    pub message: MessageConfig,
}

/// Defaults for the draft message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageConfig {
    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default = "default_body")]
    pub body_html: String,

    #[serde(default)]
    pub to: Vec<String>,
}

fn default_base_url() -> String {
    "https://graph.microsoft.com/v1.0".into()
}

fn default_slice_size() -> u64 {
    largeattach_protocol::DEFAULT_SLICE_SIZE
}

fn default_slice_timeout() -> u64 {
    120
}

fn default_subject() -> String {
    "Large attachment is here".into()
}

fn default_body() -> String {
    "The file is attached.".into()
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            body_html: default_body(),
            to: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            access_token: String::new(),
            graph_base_url: default_base_url(),
            slice_size: default_slice_size(),
            slice_timeout_secs: default_slice_timeout(),
            message: MessageConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or writes a default there if missing.
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix (may contain a token).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Token from the environment if set, otherwise from the file.
    pub fn resolve_token(&self, env_token: Option<String>) -> Option<String> {
        env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| Some(self.access_token.clone()).filter(|t| !t.trim().is_empty()))
    }

    /// Checks the fields the workflow cannot run without.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.user_id.trim().is_empty() {
            anyhow::bail!("user_id is not set");
        }
        if self.slice_timeout_secs == 0 {
            anyhow::bail!("slice_timeout_secs must be greater than zero");
        }
        largeattach_transfer::validate_slice_size(self.slice_size)?;
        Ok(())
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("largeattach").join("config.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("largeattach")
            .join("config.toml")
    }
}
