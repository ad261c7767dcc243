//! # Service Configuration
//!
//! Configuration for the service layer: database location, cache TTL, the
//! active branch and vendor endpoints.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LATS_BRANCH_ID=dar-main                                            │
//! │     LATS_CHILD_VARIANT_TTL_SECS=120                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/lats-pos/lats.toml (Linux)                               │
//! │     ~/Library/Application Support/com.lats.pos/lats.toml (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "lats.db"
//!
//! [cache]
//! child_variant_ttl_secs = 300
//!
//! [branch]
//! id = "main"
//! name = "Main Branch"
//!
//! [integrations]
//! green_api_url = "https://api.green-api.com"
//! sms_proxy_url = "http://localhost:8000/api/sms-proxy"
//! request_timeout_secs = 15
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use lats_core::DEFAULT_CHILD_VARIANT_TTL_SECS;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("lats.db")
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// How long preloaded child variants stay fresh.
    #[serde(default = "default_child_variant_ttl")]
    pub child_variant_ttl_secs: u64,
}

fn default_child_variant_ttl() -> u64 {
    DEFAULT_CHILD_VARIANT_TTL_SECS
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            child_variant_ttl_secs: default_child_variant_ttl(),
        }
    }
}

/// `[branch]` section: the branch selected at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSettings {
    #[serde(default = "default_branch_id")]
    pub id: String,

    #[serde(default = "default_branch_name")]
    pub name: String,
}

fn default_branch_id() -> String {
    "main".to_string()
}

fn default_branch_name() -> String {
    "Main Branch".to_string()
}

impl Default for BranchSettings {
    fn default() -> Self {
        BranchSettings {
            id: default_branch_id(),
            name: default_branch_name(),
        }
    }
}

/// `[integrations]` section: vendor endpoints.
///
/// Credentials are not stored here; they live in the `integrations` table
/// and are edited from Admin Settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    /// Green API base URL, used when an instance has no `api_url` of its own.
    #[serde(default = "default_green_api_url")]
    pub green_api_url: String,

    /// Backend proxy that relays SMS to the gateway.
    #[serde(default = "default_sms_proxy_url")]
    pub sms_proxy_url: String,

    /// HTTP client timeout for vendor calls.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_green_api_url() -> String {
    "https://api.green-api.com".to_string()
}

fn default_sms_proxy_url() -> String {
    "http://localhost:8000/api/sms-proxy".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        IntegrationSettings {
            green_api_url: default_green_api_url(),
            sms_proxy_url: default_sms_proxy_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// =============================================================================
// LatsConfig
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatsConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub branch: BranchSettings,

    #[serde(default)]
    pub integrations: IntegrationSettings,
}

impl LatsConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (lats.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(SyncError::InvalidConfig(
                "database.path must not be empty".into(),
            ));
        }

        if self.cache.child_variant_ttl_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "cache.child_variant_ttl_secs must be greater than 0".into(),
            ));
        }

        if self.integrations.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "integrations.request_timeout_secs must be greater than 0".into(),
            ));
        }

        validate_http_url("green_api_url", &self.integrations.green_api_url)?;
        validate_http_url("sms_proxy_url", &self.integrations.sms_proxy_url)?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup (the process environment in
    /// production). Unparseable numbers are ignored with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("LATS_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(ttl) = lookup("LATS_CHILD_VARIANT_TTL_SECS") {
            match ttl.parse::<u64>() {
                Ok(secs) => self.cache.child_variant_ttl_secs = secs,
                Err(_) => warn!(value = %ttl, "Ignoring invalid LATS_CHILD_VARIANT_TTL_SECS"),
            }
        }

        if let Some(id) = lookup("LATS_BRANCH_ID") {
            debug!(branch_id = %id, "Overriding branch from environment");
            self.branch.id = id;
        }

        if let Some(name) = lookup("LATS_BRANCH_NAME") {
            self.branch.name = name;
        }

        if let Some(url) = lookup("LATS_GREEN_API_URL") {
            self.integrations.green_api_url = url;
        }

        if let Some(url) = lookup("LATS_SMS_PROXY_URL") {
            self.integrations.sms_proxy_url = url;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lats", "pos")
            .map(|dirs| dirs.config_dir().join("lats.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Freshness window of the child variant cache.
    pub fn child_variant_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.child_variant_ttl_secs)
    }

    /// HTTP timeout for vendor calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.integrations.request_timeout_secs)
    }
}

fn validate_http_url(field: &str, raw: &str) -> SyncResult<()> {
    let parsed = url::Url::parse(raw)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SyncError::InvalidUrl(format!(
            "{} must use http or https, got: {}",
            field, other
        ))),
    }
}
