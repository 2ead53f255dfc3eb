/// Tidal resampling to the well logger interval.
///
/// The tide station reports every 6 minutes and the well loggers every 15,
/// so tidal readings are averaged over 15-minute buckets before the join.
/// Buckets are aligned on the logger clock: a reading at 00:12 belongs to
/// the 00:00 bucket, one at 00:18 to the 00:15 bucket.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, DurationRound, FixedOffset};

use crate::model::{AnalysisError, ResampledTidalReading, TidalReading};

/// Floors a timestamp to the start of its bucket.
pub fn bucket_start(
    timestamp: DateTime<FixedOffset>,
    interval_minutes: i64,
) -> Result<DateTime<FixedOffset>, AnalysisError> {
    timestamp
        .duration_trunc(Duration::minutes(interval_minutes))
        .map_err(|e| {
            AnalysisError::Config(format!(
                "cannot bucket {} to {} minutes: {}",
                timestamp, interval_minutes, e
            ))
        })
}

/// Averages readings per bucket. Output is ordered by bucket and contains
/// only buckets that received at least one reading.
pub fn resample_tidal(
    readings: &[TidalReading],
    interval_minutes: i64,
) -> Result<Vec<ResampledTidalReading>, AnalysisError> {
    let mut buckets: BTreeMap<DateTime<FixedOffset>, (f64, usize)> = BTreeMap::new();

    for reading in readings {
        let start = bucket_start(reading.timestamp, interval_minutes)?;
        let entry = buckets.entry(start).or_insert((0.0, 0));
        entry.0 += reading.water_level_m;
        entry.1 += 1;
    }

    Ok(buckets
        .into_iter()
        .map(|(timestamp, (sum, count))| ResampledTidalReading {
            timestamp,
            water_level_m: sum / count as f64,
            sample_count: count,
        })
        .collect())
}
