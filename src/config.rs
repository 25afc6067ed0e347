use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ephemeris::{SiderealMode, TopoPosition};
use crate::errors::ConfigError;
use crate::ffi::DEFAULT_LIBRARY;

/// File name searched for by `Config::discover`
pub const CONFIG_FILE: &str = "swe-bridge.toml";

/// Overrides `[library] path`
pub const LIBRARY_ENV: &str = "SWE_BRIDGE_LIBRARY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub ephemeris: EphemerisConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path or platform search name of the Swiss Ephemeris shared library
    #[serde(default = "default_library")]
    pub path: String,
}

/// Process-wide state applied once the library is loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EphemerisConfig {
    #[serde(default)]
    pub ephe_path: Option<String>,

    #[serde(default)]
    pub jpl_file: Option<String>,

    #[serde(default)]
    pub sidereal: Option<SiderealMode>,

    #[serde(default)]
    pub topo: Option<TopoPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,

    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub show_spans: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: default_library(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            file: None,
            show_spans: false,
        }
    }
}

fn default_library() -> String {
    DEFAULT_LIBRARY.to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find and load `swe-bridge.toml` from the current directory or its parents
    ///
    /// Falls back to defaults when no readable file is found.
    pub fn discover() -> Self {
        let mut current = std::env::current_dir().ok();

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(err) => {
                        tracing::warn!(path = %config_path.display(), %err, "ignoring unreadable config");
                    }
                }
            }

            current = dir.parent().map(|p| p.to_path_buf());
        }

        Self::default()
    }

    /// Apply environment overrides
    pub fn with_env(mut self) -> Self {
        if let Ok(path) = std::env::var(LIBRARY_ENV) {
            if !path.is_empty() {
                self.library.path = path;
            }
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.library.path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "library.path",
                reason: "must not be empty".into(),
            });
        }
        if let Some(topo) = &self.ephemeris.topo {
            if !(-90.0..=90.0).contains(&topo.latitude) {
                return Err(ConfigError::Invalid {
                    field: "ephemeris.topo.latitude",
                    reason: format!("{} is outside [-90, 90]", topo.latitude),
                });
            }
        }
        Ok(())
    }

    /// Generate default configuration file content
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;

        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}
