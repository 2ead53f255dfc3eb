/// Tidal gauge export loader
///
/// Reads the 6-minute water-level export of the tide station. Columns are
/// located by header name (timestamp, water level, quality flag); any other
/// columns in the export are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::FixedOffset;

use super::{column_index, parse_optional_level, parse_timestamp};
use crate::config::InputConfig;
use crate::model::{AnalysisError, TidalReading};

/// Load the tidal export from disk.
pub fn load_tidal_csv(
    path: &Path,
    input: &InputConfig,
    offset: FixedOffset,
) -> Result<Vec<TidalReading>, AnalysisError> {
    let file = File::open(path)?;
    parse_tidal_csv(file, &path.display().to_string(), input, offset)
}

/// Parse a tidal export from any reader. `source` names the input in errors.
///
/// Rows with an empty water level are skipped once their timestamp has
/// parsed; every other malformed cell aborts the load.
pub fn parse_tidal_csv<R: Read>(
    reader: R,
    source: &str,
    input: &InputConfig,
    offset: FixedOffset,
) -> Result<Vec<TidalReading>, AnalysisError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let ts_idx = column_index(&headers, &input.timestamp_column, source)?;
    let level_idx = column_index(&headers, &input.tidal_level_column, source)?;
    let quality_idx = column_index(&headers, &input.tidal_quality_column, source)?;

    let mut readings = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let timestamp = parse_timestamp(field(ts_idx), &input.timestamp_format, offset)?;
        let Some(water_level_m) = parse_optional_level(field(level_idx), &input.tidal_level_column)?
        else {
            continue;
        };

        readings.push(TidalReading {
            timestamp,
            water_level_m,
            quality: field(quality_idx).to_string(),
        });
    }

    Ok(readings)
}

/// Counts readings whose quality flag is not the verified marker.
///
/// The dataset is expected to be fully verified; the count is reported,
/// not acted on.
pub fn count_unverified(readings: &[TidalReading], verified_flag: &str) -> usize {
    readings
        .iter()
        .filter(|r| !r.quality.eq_ignore_ascii_case(verified_flag))
        .count()
}
