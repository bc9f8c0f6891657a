//! Cache configuration with layered loading and validation
//!
//! Precedence, lowest to highest: built-in defaults, the JSON config file,
//! then `STOWAGE_CACHE_*` environment variables.

use crate::errors::{CacheError, RecoveryHint, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_MAX_SIZE: i64 = 1000;
const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "STOWAGE_CACHE_CONFIG";

/// Settings shared by every cache in the crate
///
/// Each cache reads only the fields that apply to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry count before LRU eviction; also the tiered cache's primary bound
    pub max_size: i64,
    /// Backing-store sizing hint, validated but otherwise unused
    pub load_factor: f32,
    /// Expiry age in milliseconds; negative disables expiry
    pub timeout_ms: i64,
    /// Weight budget of the memory-sensitive tier; `None` is unbounded
    pub overflow_max_weight: Option<u64>,
    /// Move overflow-tier hits back into the primary tier
    pub promote_on_hit: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            load_factor: DEFAULT_LOAD_FACTOR,
            timeout_ms: -1,
            overflow_max_weight: None,
            promote_on_hit: false,
        }
    }
}

impl CacheConfig {
    /// Check every field, failing on the first invalid one
    pub fn validate(&self) -> Result<()> {
        self.validated_max_size()?;
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(CacheError::Configuration {
                field: "load_factor",
                message: format!("must be a positive number, got {}", self.load_factor),
                recovery_hint: RecoveryHint::UseDefault {
                    value: DEFAULT_LOAD_FACTOR.to_string(),
                },
            });
        }
        Ok(())
    }

    pub(crate) fn validated_max_size(&self) -> Result<usize> {
        usize::try_from(self.max_size).map_err(|_| CacheError::Configuration {
            field: "max_size",
            message: format!("must not be negative, got {}", self.max_size),
            recovery_hint: RecoveryHint::UseDefault {
                value: DEFAULT_MAX_SIZE.to_string(),
            },
        })
    }

    /// Expiry timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_ms)
            .ok()
            .map(Duration::from_millis)
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    Default,
    ConfigFile(PathBuf),
    EnvironmentVariable(String),
}

/// Configuration together with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: CacheConfig,
    pub source: ConfigSource,
}

/// Builder for creating cache configurations
#[derive(Debug, Clone, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_size(mut self, max_size: i64) -> Self {
        self.config.max_size = max_size;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.config.load_factor = load_factor;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    pub fn with_overflow_max_weight(mut self, max_weight: u64) -> Self {
        self.config.overflow_max_weight = Some(max_weight);
        self
    }

    pub fn with_promote_on_hit(mut self, promote: bool) -> Self {
        self.config.promote_on_hit = promote;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<CacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration loader that handles precedence
pub struct CacheConfigLoader;

impl CacheConfigLoader {
    /// Load configuration from defaults, the config file, then the environment
    pub fn load() -> Result<LoadedConfig> {
        let mut loaded = LoadedConfig {
            config: CacheConfig::default(),
            source: ConfigSource::Default,
        };

        if let Some(path) = Self::config_file_path() {
            if path.exists() {
                loaded.config = Self::from_file(&path)?;
                loaded.source = ConfigSource::ConfigFile(path);
            }
        }

        if let Some(var) = Self::apply_env(&mut loaded.config)? {
            loaded.source = ConfigSource::EnvironmentVariable(var);
        }

        loaded.config.validate()?;
        tracing::debug!(source = ?loaded.source, config = ?loaded.config, "loaded cache configuration");
        Ok(loaded)
    }

    /// Parse a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<CacheConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            operation: "read config file",
            source: e,
            recovery_hint: RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
        })?;

        serde_json::from_str(&content).map_err(|e| CacheError::Serialization {
            origin: path.display().to_string(),
            source: Box::new(e),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check config file syntax".to_string(),
            },
        })
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<CacheConfig> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlay `STOWAGE_CACHE_*` variables, returning the last one applied
    pub fn apply_env(config: &mut CacheConfig) -> Result<Option<String>> {
        let mut applied = None;

        if let Some(max_size) = env_value::<i64>("STOWAGE_CACHE_MAX_SIZE", "max_size")? {
            config.max_size = max_size;
            applied = Some("STOWAGE_CACHE_MAX_SIZE".to_string());
        }

        if let Some(load_factor) = env_value::<f32>("STOWAGE_CACHE_LOAD_FACTOR", "load_factor")? {
            config.load_factor = load_factor;
            applied = Some("STOWAGE_CACHE_LOAD_FACTOR".to_string());
        }

        if let Some(timeout_ms) = env_value::<i64>("STOWAGE_CACHE_TIMEOUT_MS", "timeout_ms")? {
            config.timeout_ms = timeout_ms;
            applied = Some("STOWAGE_CACHE_TIMEOUT_MS".to_string());
        }

        if let Some(max_weight) =
            env_value::<u64>("STOWAGE_CACHE_OVERFLOW_MAX_WEIGHT", "overflow_max_weight")?
        {
            config.overflow_max_weight = Some(max_weight);
            applied = Some("STOWAGE_CACHE_OVERFLOW_MAX_WEIGHT".to_string());
        }

        if let Some(promote) =
            env_value::<bool>("STOWAGE_CACHE_PROMOTE_ON_HIT", "promote_on_hit")?
        {
            config.promote_on_hit = promote;
            applied = Some("STOWAGE_CACHE_PROMOTE_ON_HIT".to_string());
        }

        Ok(applied)
    }

    /// `$STOWAGE_CACHE_CONFIG`, else `<config dir>/stowage/cache.json`
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(explicit));
        }
        dirs::config_dir().map(|dir| dir.join("stowage").join("cache.json"))
    }
}

fn env_value<T>(var: &str, field: &'static str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| CacheError::configuration(field, format!("{var}={raw:?}: {e}")))
}
