/// Structured logging for the compliance engine.
///
/// Provides context-rich logging with pool identifiers, timestamps, and
/// severity levels. Supports both console output and file-based logging for
/// service operation. Logging is observability only — no engine decision
/// depends on logger state, and an uninitialized logger drops messages
/// silently, so the engine stays pure with respect to its inputs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::{EngineError, ExclusionReason};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine Components
// ---------------------------------------------------------------------------

/// Which part of the engine produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Catalog,
    Validator,
    Aggregator,
    Trend,
    Alert,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Catalog => write!(f, "CATALOG"),
            Component::Validator => write!(f, "VALIDATE"),
            Component::Aggregator => write!(f, "STATUS"),
            Component::Trend => write!(f, "TREND"),
            Component::Alert => write!(f, "ALERT"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *LOGGER.lock().unwrap() = Some(logger);
    }

    fn log(&self, level: LogLevel, component: &Component, pool_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let pool_part = pool_id.map(|p| format!(" [{}]", p)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, component, pool_part, message
        );

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, pool_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, pool_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(component: Component, pool_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, &component, pool_id, message);
    }
}

/// Log a warning message
pub fn warn(component: Component, pool_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, &component, pool_id, message);
    }
}

/// Log an error message
pub fn error(component: Component, pool_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, &component, pool_id, message);
    }
}

/// Log a debug message
pub fn debug(component: Component, pool_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, &component, pool_id, message);
    }
}

// ---------------------------------------------------------------------------
// Exclusion Logging
// ---------------------------------------------------------------------------

/// Picks a log level for a parameter exclusion.
///
/// A missing parameter is routine (technicians rarely measure every
/// parameter on every visit); an implausible value suggests a sensor or
/// data-entry fault and deserves a warning.
pub fn exclusion_level(reason: &ExclusionReason) -> LogLevel {
    match reason {
        ExclusionReason::Missing => LogLevel::Debug,
        ExclusionReason::Implausible { .. } => LogLevel::Warning,
    }
}

/// Log a parameter exclusion with level chosen by its reason.
pub fn log_exclusion(pool_id: &str, reason: &ExclusionReason, err: &EngineError) {
    let message = format!("excluded from aggregation: {}", err);
    match exclusion_level(reason) {
        LogLevel::Warning => warn(Component::Validator, Some(pool_id), &message),
        _ => debug(Component::Validator, Some(pool_id), &message),
    }
}
