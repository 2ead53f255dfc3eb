/// Loaders for the tidal gauge and well logger exports.
///
/// Both exports are header-row CSV files with local-clock timestamps. The
/// clock offset comes from configuration and is bound to every timestamp
/// here, so nothing downstream depends on the process time zone.
///
/// Submodules:
/// - `tidal`: 6-minute tidal gauge readings and their quality audit.
/// - `wells`: wide 15-minute well table, cutoff filtering.

pub mod tidal;
pub mod wells;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use csv::StringRecord;

use crate::model::AnalysisError;

/// Parses a local-clock timestamp and binds it to `offset`.
pub fn parse_timestamp(
    value: &str,
    format: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, AnalysisError> {
    let parse_error = || AnalysisError::TimestampParse {
        value: value.to_string(),
        format: format.to_string(),
    };

    let naive = NaiveDateTime::parse_from_str(value.trim(), format).map_err(|_| parse_error())?;
    offset.from_local_datetime(&naive).single().ok_or_else(parse_error)
}

/// Parses a numeric cell, treating empty cells and "NA"/"NaN"/"null" as missing.
pub(crate) fn parse_optional_level(
    value: &str,
    column: &str,
) -> Result<Option<f64>, AnalysisError> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
    {
        return Ok(None);
    }

    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| AnalysisError::ValueParse {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Finds the index of a named column in a header row.
pub(crate) fn column_index(
    headers: &StringRecord,
    column: &str,
    file: &str,
) -> Result<usize, AnalysisError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| AnalysisError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        })
}
