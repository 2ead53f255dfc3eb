/// Well logger export loader
///
/// The export is wide: a timestamp column followed by one water-level column
/// per well. Only columns named in the well registry are read, so stray
/// columns (battery voltage, logger temperature) are ignored. A registered
/// well missing from the header is not an error; it simply has no data.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, FixedOffset};

use super::{column_index, parse_optional_level, parse_timestamp};
use crate::config::InputConfig;
use crate::model::{AnalysisError, WellRow, WellTable};
use crate::wells::all_well_ids;

/// Load the well export from disk, dropping rows before `cutoff`.
pub fn load_wells_csv(
    path: &Path,
    input: &InputConfig,
    offset: FixedOffset,
    cutoff: DateTime<FixedOffset>,
) -> Result<WellTable, AnalysisError> {
    let file = File::open(path)?;
    parse_wells_csv(file, &path.display().to_string(), input, offset, cutoff)
}

/// Parse a wide well export from any reader.
pub fn parse_wells_csv<R: Read>(
    reader: R,
    source: &str,
    input: &InputConfig,
    offset: FixedOffset,
    cutoff: DateTime<FixedOffset>,
) -> Result<WellTable, AnalysisError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let ts_idx = column_index(&headers, &input.timestamp_column, source)?;

    let mut well_ids = Vec::new();
    let mut well_cols = Vec::new();
    for id in all_well_ids() {
        if let Ok(idx) = column_index(&headers, id, source) {
            well_ids.push(id.to_string());
            well_cols.push(idx);
        }
    }

    let mut rows: Vec<WellRow> = Vec::new();
    for (row_number, record) in csv_reader.records().enumerate() {
        let record = record?;
        let timestamp =
            parse_timestamp(record.get(ts_idx).unwrap_or(""), &input.timestamp_format, offset)?;

        if let Some(prev) = rows.last() {
            if timestamp <= prev.timestamp {
                return Err(AnalysisError::NonMonotonic { row: row_number + 1 });
            }
        }

        let levels = well_cols
            .iter()
            .zip(&well_ids)
            .map(|(&idx, id)| parse_optional_level(record.get(idx).unwrap_or(""), id))
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(WellRow { timestamp, levels });
    }

    Ok(WellTable {
        well_ids,
        rows: apply_cutoff(rows, cutoff),
    })
}

/// Drops rows recorded before the loggers had equilibrated.
pub fn apply_cutoff(rows: Vec<WellRow>, cutoff: DateTime<FixedOffset>) -> Vec<WellRow> {
    rows.into_iter().filter(|r| r.timestamp >= cutoff).collect()
}
