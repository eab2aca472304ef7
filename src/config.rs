//! Configuration loading helpers.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::WindowPoolError;
use crate::mapper::{MapperKind, StoreFileMapper};
use crate::pool::{ScanResistantWindowPool, WindowPoolConfig};

const CONFIG_PATH_VAR: &str = "OXIWINDOW_CONFIG";
const OVERRIDE_PREFIX: &str = "OXIWINDOW__";

/// Errors returned by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error while reading config files or opening the store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Invalid value for a key.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Raw value string.
        value: String,
    },
    /// Unknown configuration key.
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    /// Missing required configuration field.
    #[error("missing required field: {0}")]
    MissingField(String),
    /// The resulting pool configuration is invalid.
    #[error("invalid pool configuration: {0}")]
    Pool(#[from] WindowPoolError),
}

/// Top-level configuration schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OxiwindowConfig {
    /// Window pool configuration.
    pub pool: Option<PoolConfigSpec>,
    /// Store file mapper configuration.
    pub mapper: Option<MapperConfigSpec>,
}

impl OxiwindowConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from the `OXIWINDOW_CONFIG` env var (if set),
    /// then apply `OXIWINDOW__section__field` overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_VAR).ok() {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides in-place.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            if !key.starts_with(OVERRIDE_PREFIX) {
                continue;
            }
            self.apply_override(&key, value.trim())?;
        }
        Ok(())
    }

    /// Apply a single `OXIWINDOW__section__field` override.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let path = key
            .strip_prefix(OVERRIDE_PREFIX)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?
            .to_ascii_lowercase();
        let parts: Vec<&str> = path.split("__").collect();

        match parts.as_slice() {
            ["pool", "store_name"] => {
                self.pool_mut().store_name = Some(value.to_string());
            }
            ["pool", "bytes_per_record"] => {
                self.pool_mut().bytes_per_record = Some(parse_value(key, value)?);
            }
            ["pool", "target_bytes_per_page"] => {
                self.pool_mut().target_bytes_per_page = Some(parse_value(key, value)?);
            }
            ["pool", "capacity"] => {
                self.pool_mut().capacity = Some(parse_value(key, value)?);
            }
            ["pool", "report_interval"] => {
                self.pool_mut().report_interval = Some(parse_value(key, value)?);
            }
            ["pool", "protected_fraction"] => {
                self.pool_mut().protected_fraction = Some(parse_value(key, value)?);
            }
            ["pool", "long_term_fraction"] => {
                self.pool_mut().long_term_fraction = Some(parse_value(key, value)?);
            }
            ["mapper", "kind"] => {
                self.mapper_mut().kind = Some(value.to_string());
            }
            ["mapper", "path"] => {
                self.mapper_mut().path = Some(PathBuf::from(value));
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        Ok(())
    }

    /// Build a `WindowPoolConfig` using defaults plus overrides.
    ///
    /// Without an explicit store name, the mapper path names the store.
    pub fn to_window_pool_config(&self) -> WindowPoolConfig {
        let mut config = WindowPoolConfig::default();
        if let Some(path) = self.mapper.as_ref().and_then(|m| m.path.as_ref()) {
            config.store_name = path.display().to_string();
        }
        if let Some(pool) = &self.pool {
            pool.apply_to(&mut config);
        }
        config
    }

    /// Resolve the mapper configuration, if present.
    pub fn mapper_config(&self) -> Result<Option<MapperConfig>, ConfigError> {
        match self.mapper.as_ref() {
            Some(spec) => Ok(Some(spec.resolve()?)),
            None => Ok(None),
        }
    }

    /// Open the store file mapper from the configuration, if present.
    pub fn open_mapper(&self) -> Result<Option<StoreFileMapper>, ConfigError> {
        match self.mapper_config()? {
            Some(mapper) => Ok(Some(mapper.open()?)),
            None => Ok(None),
        }
    }

    /// Open a window pool over the configured store file.
    pub fn open_pool(&self) -> Result<ScanResistantWindowPool<StoreFileMapper>, ConfigError> {
        let mapper = self
            .open_mapper()?
            .ok_or_else(|| ConfigError::MissingField("mapper.path".into()))?;
        Ok(ScanResistantWindowPool::new(
            self.to_window_pool_config(),
            mapper,
        )?)
    }

    fn pool_mut(&mut self) -> &mut PoolConfigSpec {
        self.pool.get_or_insert_with(PoolConfigSpec::default)
    }

    fn mapper_mut(&mut self) -> &mut MapperConfigSpec {
        self.mapper.get_or_insert_with(MapperConfigSpec::default)
    }
}

/// Window pool configuration overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfigSpec {
    /// Store name used in reports.
    pub store_name: Option<String>,
    /// Record size in bytes.
    pub bytes_per_record: Option<u32>,
    /// Target page size in bytes.
    pub target_bytes_per_page: Option<u32>,
    /// Maximum resident pages.
    pub capacity: Option<usize>,
    /// Acquisitions between hit-rate samples.
    pub report_interval: Option<u64>,
    /// Share of capacity for the protected tiers.
    pub protected_fraction: Option<f64>,
    /// Share of capacity for the long-term tier.
    pub long_term_fraction: Option<f64>,
}

impl PoolConfigSpec {
    fn apply_to(&self, config: &mut WindowPoolConfig) {
        if let Some(value) = &self.store_name {
            config.store_name = value.clone();
        }
        if let Some(value) = self.bytes_per_record {
            config.bytes_per_record = value;
        }
        if let Some(value) = self.target_bytes_per_page {
            config.target_bytes_per_page = value;
        }
        if let Some(value) = self.capacity {
            config.capacity = value;
        }
        if let Some(value) = self.report_interval {
            config.report_interval = value;
        }
        if let Some(value) = self.protected_fraction {
            config.protected_fraction = value.clamp(0.0, 1.0);
        }
        if let Some(value) = self.long_term_fraction {
            config.long_term_fraction = value.clamp(0.0, 1.0);
        }
    }
}

/// Mapper configuration from TOML/env.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapperConfigSpec {
    /// Mapper kind: "mmap" or "read". Defaults to "mmap".
    pub kind: Option<String>,
    /// Path to the store file.
    pub path: Option<PathBuf>,
}

impl MapperConfigSpec {
    fn resolve(&self) -> Result<MapperConfig, ConfigError> {
        let kind = match self.kind.as_deref() {
            Some(raw) => raw.parse().map_err(|value| ConfigError::InvalidValue {
                key: "mapper.kind".into(),
                value,
            })?,
            None => MapperKind::default(),
        };
        let path = self
            .path
            .clone()
            .ok_or_else(|| ConfigError::MissingField("mapper.path".into()))?;
        Ok(MapperConfig { kind, path })
    }
}

/// Resolved mapper configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// How windows are mapped.
    pub kind: MapperKind,
    /// Path to the store file.
    pub path: PathBuf,
}

impl MapperConfig {
    /// Open the store file described by this config.
    pub fn open(&self) -> Result<StoreFileMapper, ConfigError> {
        Ok(StoreFileMapper::open(self.kind, &self.path)?)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
