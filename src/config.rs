//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\cadin-lookup\config.toml
//! - macOS: ~/Library/Application Support/cadin-lookup/config.toml
//! - Linux: ~/.config/cadin-lookup/config.toml
//!
//! Every provider credential can also come from the environment
//! (`GATEWAY_URL`, `INTERNAL_API_KEY`, `SERPRO_CADIN_BASE`, `SERPRO_TOKEN`,
//! `PMSP_GATEWAY_URL`, `PMSP_API_KEY`); those win over the file. The result
//! is frozen into a [`ProviderSettings`] before any lookup runs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cadin::settings::{DEFAULT_CACHE_TTL, Endpoint, ProviderSettings};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General gateway (recommended)
    pub gateway: GatewayConfig,

    /// Direct SERPRO access (optional)
    pub serpro: SerproConfig,

    /// PMSP municipal gateway, serves both PF and PJ
    pub pmsp: PmspConfig,

    pub municipal: MunicipalConfig,

    pub cache: CacheConfig,

    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub url: Option<String>,
    /// Sent as `X-API-Key`
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerproConfig {
    pub url: Option<String>,
    /// Bearer token
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PmspConfig {
    pub url: Option<String>,
    /// Sent as `X-API-Key`
    pub api_key: Option<String>,
}

/// Municipal flow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MunicipalConfig {
    /// Try PMSP before the general flow (only if the gateway is configured)
    pub enabled: bool,
}

impl Default for MunicipalConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Result cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a provider response is reused, in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

/// Batch processing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Documents resolved at the same time (1 = one after another)
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Values taken from the command line / environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gateway_url: Option<String>,
    pub gateway_api_key: Option<String>,
    pub serpro_url: Option<String>,
    pub serpro_token: Option<String>,
    pub pmsp_url: Option<String>,
    pub pmsp_api_key: Option<String>,
    pub disable_municipal: bool,
    pub batch_concurrency: Option<usize>,
}

impl Config {
    /// Apply command line / environment values on top of the file.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        fn set(target: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        set(&mut self.gateway.url, &overrides.gateway_url);
        set(&mut self.gateway.api_key, &overrides.gateway_api_key);
        set(&mut self.serpro.url, &overrides.serpro_url);
        set(&mut self.serpro.token, &overrides.serpro_token);
        set(&mut self.pmsp.url, &overrides.pmsp_url);
        set(&mut self.pmsp.api_key, &overrides.pmsp_api_key);

        if overrides.disable_municipal {
            self.municipal.enabled = false;
        }
        if let Some(n) = overrides.batch_concurrency {
            self.batch.concurrency = n;
        }
    }

    /// Freeze into the value the resolution service consumes.
    ///
    /// The municipal flow is only enabled when the PMSP gateway is configured.
    pub fn provider_settings(&self) -> ProviderSettings {
        fn endpoint(url: &Option<String>, credential: &Option<String>) -> Endpoint {
            Endpoint::new(
                url.clone().unwrap_or_default(),
                credential.clone().unwrap_or_default(),
            )
        }

        let municipal = endpoint(&self.pmsp.url, &self.pmsp.api_key);
        ProviderSettings {
            gateway: endpoint(&self.gateway.url, &self.gateway.api_key),
            direct: endpoint(&self.serpro.url, &self.serpro.token),
            municipal_enabled: self.municipal.enabled && municipal.is_configured(),
            municipal,
            cache_ttl: Duration::from_secs(self.cache.ttl_secs),
            batch_concurrency: self.batch.concurrency.max(1),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cadin-lookup"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicit path
///
/// Unlike [`load`], a missing or malformed file is an error: the user asked for it.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
