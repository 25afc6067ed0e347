//! Logging infrastructure - structured tracing for bridge calls
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Per-target filtering (`bridge`, `memory`, `ffi`)
//! - Text or JSON console output
//! - Optional non-blocking file output

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Keeps the file writer flushing until process exit
static FILE_GUARD: Mutex<Option<WorkerGuard>> = parking_lot::const_mutex(None);

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Log file path, console only when `None`
    pub log_path: Option<PathBuf>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Create config from the `[logging]` section
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: parse_level(&config.level).unwrap_or(Level::INFO),
            log_path: config.file.clone(),
            json_format: config.json,
            show_spans: config.show_spans,
        }
    }

    /// Apply `SWE_BRIDGE_LOG_*` overrides
    pub fn with_env(mut self) -> Self {
        // SWE_BRIDGE_LOG_LEVEL: trace, debug, info, warn, error
        if let Some(level) = std::env::var("SWE_BRIDGE_LOG_LEVEL")
            .ok()
            .and_then(|s| parse_level(&s))
        {
            self.level = level;
        }

        // SWE_BRIDGE_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("SWE_BRIDGE_LOG_FILE") {
            self.log_path = Some(PathBuf::from(path));
        }

        if std::env::var("SWE_BRIDGE_LOG_JSON").is_ok() {
            self.json_format = true;
        }

        if std::env::var("SWE_BRIDGE_LOG_SPANS").is_ok() {
            self.show_spans = true;
        }

        self
    }

    /// Verbose logging for diagnosing a guest
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            log_path: None,
            json_format: false,
            show_spans: true,
        }
    }
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize logging with default configuration
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration
///
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = config.level.as_str().to_lowercase();
            EnvFilter::new(format!(
                "sweph_bridge={level},bridge={level},memory={level},ffi={level}"
            ))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let (text_layer, json_layer) = if config.json_format {
            (None, Some(fmt::layer().json().with_writer(io::stderr)))
        } else {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_span_events(span_events)
                .with_target(true)
                .with_line_number(cfg!(debug_assertions));
            (Some(layer), None)
        };

        let file_layer = config.log_path.as_ref().and_then(|path| {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file = path.file_name()?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));
            *FILE_GUARD.lock() = Some(guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(text_layer)
            .with(json_layer)
            .with(file_layer)
            .try_init()
            .ok(); // Another subscriber may already be installed
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}
