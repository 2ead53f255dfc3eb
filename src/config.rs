/// Run configuration for the tidal aquifer analysis.
///
/// Loaded from a TOML file. Every section and field has a default, so an
/// empty file (or no file at all) reproduces the study's published settings.
///
/// ```toml
/// [input]
/// tidal_csv = "data/tides.csv"
/// wells_csv = "data/wells.csv"
/// utc_offset = "-08:00"
/// cutoff = "07/01/2019 00:00"
///
/// [analysis]
/// max_lag_steps = 40
/// period_band_minutes = [650.0, 800.0]
/// fft_bins = [770, 870]
/// ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::ingest::parse_timestamp;
use crate::logging::LogLevel;
use crate::model::AnalysisError;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input: InputConfig,
    pub analysis: AnalysisParams,
    pub constants: PhysicalConstants,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Where the exports live and how to read them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub tidal_csv: PathBuf,
    pub wells_csv: PathBuf,
    pub timestamp_column: String,
    pub tidal_level_column: String,
    pub tidal_quality_column: String,
    /// Quality flag value of a verified tidal reading.
    pub verified_flag: String,
    /// chrono format string shared by both exports.
    pub timestamp_format: String,
    /// Fixed offset of the logger clocks, e.g. "-08:00" for local standard time.
    pub utc_offset: String,
    /// Well readings before this instant are an equilibration artifact.
    pub cutoff: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tidal_csv: PathBuf::from("data/tides.csv"),
            wells_csv: PathBuf::from("data/wells.csv"),
            timestamp_column: "Date Time".to_string(),
            tidal_level_column: "Water Level".to_string(),
            tidal_quality_column: "Quality".to_string(),
            verified_flag: "v".to_string(),
            timestamp_format: "%m/%d/%Y %H:%M".to_string(),
            utc_offset: "-08:00".to_string(),
            cutoff: "07/01/2019 00:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Well logger sampling interval; also the tidal resampling bucket.
    pub sample_interval_minutes: i64,
    /// Largest non-negative lag tried by the cross-correlation.
    pub max_lag_steps: usize,
    /// Modified Daniell smoothing span for the periodogram.
    pub spectral_span: usize,
    /// Inclusive period band searched for the semidiurnal peak.
    pub period_band_minutes: [f64; 2],
    /// Inclusive Fourier bin range searched for the tidal coefficient.
    pub fft_bins: [usize; 2],
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            sample_interval_minutes: 15,
            max_lag_steps: 40,
            spectral_span: 3,
            period_band_minutes: [650.0, 800.0],
            fft_bins: [770, 870],
        }
    }
}

/// Constants shared by every well in the Jacob–Ferris calculation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Compressibility of water β, m²/N.
    pub fluid_compressibility: f64,
    /// Unit weight of water γw, N/m³.
    pub unit_weight: f64,
    /// Multiplier applied to K computed in m/min (1440 gives m/day).
    pub conductivity_conversion: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            fluid_compressibility: 4.4e-10,
            unit_weight: 9810.0,
            conductivity_conversion: 1440.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Length of the time-series subset plotted per well.
    pub timeseries_days: i64,
    pub histogram_bins: usize,
    pub render_plots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            timeseries_days: 5,
            histogram_bins: 30,
            render_plots: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and derived values
// ---------------------------------------------------------------------------

/// Reads and parses a TOML config file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, AnalysisError> {
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}

/// Parses TOML text into a config and validates the derived values.
pub fn parse_config(text: &str) -> Result<AnalysisConfig, AnalysisError> {
    let config: AnalysisConfig =
        toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

impl AnalysisConfig {
    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.offset()?;
        self.cutoff()?;

        let params = &self.analysis;
        if params.sample_interval_minutes <= 0 {
            return Err(AnalysisError::Config(
                "sample_interval_minutes must be positive".to_string(),
            ));
        }
        let [low, high] = params.period_band_minutes;
        if !(low > 0.0 && low < high) {
            return Err(AnalysisError::Config(format!(
                "period band [{}, {}] must be positive and ascending",
                low, high
            )));
        }
        if params.fft_bins[0] > params.fft_bins[1] {
            return Err(AnalysisError::Config(format!(
                "fft_bins [{}, {}] must be ascending",
                params.fft_bins[0], params.fft_bins[1]
            )));
        }
        if params.spectral_span == 0 {
            return Err(AnalysisError::Config("spectral_span must be at least 1".to_string()));
        }
        Ok(())
    }

    /// The logger clock offset.
    pub fn offset(&self) -> Result<FixedOffset, AnalysisError> {
        parse_utc_offset(&self.input.utc_offset)
    }

    /// The equilibration cutoff as an instant in the logger offset.
    pub fn cutoff(&self) -> Result<DateTime<FixedOffset>, AnalysisError> {
        parse_timestamp(&self.input.cutoff, &self.input.timestamp_format, self.offset()?)
    }
}

/// Parses "+HH:MM" / "-HH:MM" into a fixed offset.
pub fn parse_utc_offset(text: &str) -> Result<FixedOffset, AnalysisError> {
    text.trim()
        .parse::<FixedOffset>()
        .map_err(|_| AnalysisError::Config(format!("invalid utc_offset '{}'", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_study_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.analysis.max_lag_steps, 40);
        assert_eq!(config.analysis.sample_interval_minutes, 15);
        assert_eq!(config.analysis.fft_bins, [770, 870]);
        assert_eq!(config.constants.fluid_compressibility, 4.4e-10);
        assert_eq!(config.input.timestamp_format, "%m/%d/%Y %H:%M");
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config(
            r#"
            [analysis]
            max_lag_steps = 20

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.max_lag_steps, 20);
        assert_eq!(config.analysis.spectral_span, 3);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_offset_parsing() {
        assert_eq!(parse_utc_offset("-08:00").unwrap().local_minus_utc(), -8 * 3600);
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 5 * 3600 + 1800);
        assert!(parse_utc_offset("08:00").is_err());
        assert!(parse_utc_offset("-25:00").is_err());
        assert!(parse_utc_offset("PST").is_err());
    }

    #[test]
    fn test_cutoff_is_bound_to_configured_offset() {
        let config = AnalysisConfig::default();
        let cutoff = config.cutoff().unwrap();
        assert_eq!(cutoff.offset().local_minus_utc(), -8 * 3600);
        assert_eq!(cutoff.to_rfc3339(), "2019-07-01T00:00:00-08:00");
    }

    #[test]
    fn test_invalid_band_is_rejected() {
        let err = parse_config(
            r#"
            [analysis]
            period_band_minutes = [800.0, 650.0]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let err = parse_config("[analysis\nmax_lag_steps = ").unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }
}
