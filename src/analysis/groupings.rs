/// Splits joined records into per-well series.
///
/// Every per-well stage works on one of these series independently; the
/// map is keyed by well identifier so results merge back by key in a stable
/// order.

use std::collections::BTreeMap;

use crate::model::{AnalysisError, JoinedRecord};

/// Groups records by well, each series sorted by timestamp.
pub fn group_by_well(records: &[JoinedRecord]) -> BTreeMap<String, Vec<JoinedRecord>> {
    let mut grouped: BTreeMap<String, Vec<JoinedRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.well_id.clone())
            .or_default()
            .push(record.clone());
    }
    for series in grouped.values_mut() {
        series.sort_by_key(|r| r.timestamp);
    }
    grouped
}

/// The well water levels of a series, in time order.
pub fn well_levels(series: &[JoinedRecord]) -> Vec<f64> {
    series.iter().map(|r| r.well_level_m).collect()
}

/// Number of empty sampling slots between the first and last record.
///
/// A step that is not a whole number of intervals counts as at least one
/// missing slot, since the series is then off the sampling grid.
pub fn missing_slots(series: &[JoinedRecord], interval_minutes: i64) -> usize {
    series
        .windows(2)
        .map(|pair| {
            let step = (pair[1].timestamp - pair[0].timestamp).num_minutes();
            if step == interval_minutes {
                0
            } else {
                ((step + interval_minutes - 1) / interval_minutes - 1).max(1) as usize
            }
        })
        .sum()
}

/// Well levels of a series that must be evenly sampled.
///
/// Nulls are dropped when the export is reshaped, so a logger gap shows up
/// here as a hole in the timeline rather than as a missing value.
pub fn regular_levels(
    well_id: &str,
    series: &[JoinedRecord],
    interval_minutes: i64,
) -> Result<Vec<f64>, AnalysisError> {
    let missing = missing_slots(series, interval_minutes);
    if missing > 0 {
        return Err(AnalysisError::MissingValues { well: well_id.to_string(), count: missing });
    }
    Ok(well_levels(series))
}
