/// Core data types for the tidal aquifer analysis.
///
/// This module defines the shared domain model imported by all other modules:
/// the raw readings parsed from the logger exports, the records derived from
/// them at each pipeline stage, and the single error type every stage returns.
/// It contains no logic beyond small accessors.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Raw readings
// ---------------------------------------------------------------------------

/// A single 6-minute reading from the tidal gauge export.
#[derive(Debug, Clone, PartialEq)]
pub struct TidalReading {
    pub timestamp: DateTime<FixedOffset>,
    pub water_level_m: f64,
    pub quality: String, // "v" = verified, "p" = preliminary
}

/// One row of the wide well export: a timestamp and one optional level per
/// well column, in the same order as `WellTable::well_ids`.
#[derive(Debug, Clone, PartialEq)]
pub struct WellRow {
    pub timestamp: DateTime<FixedOffset>,
    pub levels: Vec<Option<f64>>,
}

/// The well export in wide form, one row per 15-minute timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct WellTable {
    pub well_ids: Vec<String>,
    pub rows: Vec<WellRow>,
}

/// A single well reading in long (tidy) form.
#[derive(Debug, Clone, PartialEq)]
pub struct WellLevel {
    pub well_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub water_level_m: f64,
}

// ---------------------------------------------------------------------------
// Aligned records
// ---------------------------------------------------------------------------

/// Mean tidal level over one 15-minute bucket.
///
/// `timestamp` is the bucket start (timestamp floored to the interval).
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledTidalReading {
    pub timestamp: DateTime<FixedOffset>,
    pub water_level_m: f64,
    pub sample_count: usize,
}

/// A well reading paired with the tidal level of the same bucket.
///
/// `tidal_level_m` is `None` when no tidal bucket matched the timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub well_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub well_level_m: f64,
    pub tidal_level_m: Option<f64>,
}

// ---------------------------------------------------------------------------
// Derived per-well results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagResult {
    pub well_id: String,
    pub lag_steps: usize,
    pub lag_minutes: f64,
    pub correlation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralPeak {
    pub well_id: String,
    pub period_minutes: f64,
    pub frequency: f64, // cycles per sample
    pub density: f64,
}

/// Static well constants joined with the lag and period derived for it,
/// plus the Jacob–Ferris quantities computed from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConductivityRecord {
    pub well_id: String,
    pub compressibility: f64,
    pub porosity: f64,
    pub shoreline_distance_m: f64,
    pub field_conductivity: f64,
    pub lag_minutes: f64,
    pub period_minutes: f64,
    pub tidal_efficiency: f64,
    pub specific_storage: f64,
    pub conductivity: f64,
}

/// Strongest Fourier coefficient inside the tidal bin range for one well.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FftResult {
    pub well_id: String,
    pub bin: usize,
    /// |X_k| / n
    pub max_amplitude: f64,
    pub phase_rad: f64,
    pub series_len: usize,
}

impl FftResult {
    /// Amplitude of the real sinusoid that produces this bin.
    pub fn one_sided_amplitude(&self) -> f64 {
        2.0 * self.max_amplitude
    }
}

/// Outcome of the two-sample comparison of tidal-method and slug-test
/// conductivities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTestResult {
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    pub mean_computed: f64,
    pub mean_field: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort an analysis run.
#[derive(Debug)]
pub enum AnalysisError {
    /// An input file could not be opened or an output could not be written.
    Io(std::io::Error),
    /// The CSV reader rejected the file.
    Csv(String),
    /// A required column is absent from the header row.
    MissingColumn { file: String, column: String },
    /// A timestamp did not match the configured format.
    TimestampParse { value: String, format: String },
    /// A numeric cell could not be parsed.
    ValueParse { column: String, value: String },
    /// Wide well rows are not strictly increasing in time.
    NonMonotonic { row: usize },
    /// A well identifier is not in the registry.
    UnknownWell(String),
    /// A series that must be complete contains missing values.
    MissingValues { well: String, count: usize },
    /// Too few points to compute a statistic.
    InsufficientData(String),
    /// The configuration file is malformed.
    Config(String),
    /// A plot could not be rendered.
    Render(String),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::Io(e) => write!(f, "I/O error: {}", e),
            AnalysisError::Csv(msg) => write!(f, "CSV error: {}", msg),
            AnalysisError::MissingColumn { file, column } => {
                write!(f, "Missing column '{}' in {}", column, file)
            }
            AnalysisError::TimestampParse { value, format } => {
                write!(f, "Timestamp '{}' does not match format '{}'", value, format)
            }
            AnalysisError::ValueParse { column, value } => {
                write!(f, "Invalid value '{}' in column '{}'", value, column)
            }
            AnalysisError::NonMonotonic { row } => {
                write!(f, "Well timestamps not strictly increasing at data row {}", row)
            }
            AnalysisError::UnknownWell(id) => write!(f, "Unknown well: {}", id),
            AnalysisError::MissingValues { well, count } => {
                write!(f, "Series for well {} has {} missing values", well, count)
            }
            AnalysisError::InsufficientData(msg) => write!(f, "Insufficient data: {}", msg),
            AnalysisError::Config(msg) => write!(f, "Config error: {}", msg),
            AnalysisError::Render(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(e: std::io::Error) -> Self {
        AnalysisError::Io(e)
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(e: csv::Error) -> Self {
        AnalysisError::Csv(e.to_string())
    }
}
