/// Structured logging for the tidal aquifer analysis
///
/// Provides context-rich logging tagged with the pipeline stage and, where
/// relevant, the well identifier. Supports console output and an optional
/// log file so a full run can be archived next to its plots.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
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
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Resample,
    Join,
    Lag,
    Spectrum,
    Conductivity,
    TTest,
    Fft,
    Plot,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "LOAD"),
            Stage::Resample => write!(f, "RESAMPLE"),
            Stage::Join => write!(f, "JOIN"),
            Stage::Lag => write!(f, "LAG"),
            Stage::Spectrum => write!(f, "SPEC"),
            Stage::Conductivity => write!(f, "COND"),
            Stage::TTest => write!(f, "TTEST"),
            Stage::Fft => write!(f, "FFT"),
            Stage::Plot => write!(f, "PLOT"),
            Stage::System => write!(f, "SYS"),
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

fn global() -> MutexGuard<'static, Option<Logger>> {
    // A panic while logging must not silence the rest of the run.
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *global() = Some(logger);
    }

    fn log(&self, level: LogLevel, stage: Stage, well_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let well_part = well_id.map(|w| format!(" [{}]", w)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, stage, well_part, message);

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", stage, well_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", stage, well_part, message),
                LogLevel::Info => println!("   {}{}: {}", stage, well_part, message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", stage, well_part, message),
            }
        }

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

pub fn info(stage: Stage, well_id: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(LogLevel::Info, stage, well_id, message);
    }
}

pub fn warn(stage: Stage, well_id: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(LogLevel::Warning, stage, well_id, message);
    }
}

pub fn error(stage: Stage, well_id: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(LogLevel::Error, stage, well_id, message);
    }
}

pub fn debug(stage: Stage, well_id: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(LogLevel::Debug, stage, well_id, message);
    }
}

// ---------------------------------------------------------------------------
// Stage Summary Logging
// ---------------------------------------------------------------------------

/// Log how many wells a per-well stage produced results for.
pub fn log_stage_summary(stage: Stage, total: usize, successful: usize) {
    let skipped = total.saturating_sub(successful);
    let message = format!(
        "{}/{} wells analysed, {} skipped",
        successful, total, skipped
    );

    if skipped == 0 {
        info(stage, None, &message);
    } else if successful == 0 {
        error(stage, None, &message);
    } else {
        warn(stage, None, &message);
    }
}
