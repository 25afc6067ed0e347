use thiserror::Error;

use crate::ffi::{LoadError, SymbolError};
use crate::memory::MemoryError;

/// Errors raised while loading or parsing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Everything the bridge can report to its embedder.
///
/// Native computation failures are not in here: those travel back to the
/// guest as the routine's own status code.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to resolve `{name}`: {source}")]
    Symbol {
        name: &'static str,
        #[source]
        source: SymbolError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BridgeError {
    /// True when the guest handed over an offset outside its own memory
    pub fn is_memory_fault(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
