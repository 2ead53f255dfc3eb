/// Left join of well readings onto the resampled tide.
///
/// Matching is on exact timestamp equality against bucket starts. A well
/// reading without a tidal bucket is kept with `tidal_level_m = None`; the
/// paired statistics skip it later.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::model::{JoinedRecord, ResampledTidalReading, WellLevel};

pub fn left_join(wells: &[WellLevel], tide: &[ResampledTidalReading]) -> Vec<JoinedRecord> {
    let tide_by_time: HashMap<DateTime<FixedOffset>, f64> =
        tide.iter().map(|t| (t.timestamp, t.water_level_m)).collect();

    wells
        .iter()
        .map(|w| JoinedRecord {
            well_id: w.well_id.clone(),
            timestamp: w.timestamp,
            well_level_m: w.water_level_m,
            tidal_level_m: tide_by_time.get(&w.timestamp).copied(),
        })
        .collect()
}

/// Number of records with no matching tidal bucket.
pub fn count_unmatched(records: &[JoinedRecord]) -> usize {
    records.iter().filter(|r| r.tidal_level_m.is_none()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2019, 7, 1, 0, minute, 0)
            .unwrap()
    }

    fn well(minute: u32, level: f64) -> WellLevel {
        WellLevel { well_id: "MW-1".to_string(), timestamp: at(minute), water_level_m: level }
    }

    fn tide(minute: u32, level: f64) -> ResampledTidalReading {
        ResampledTidalReading { timestamp: at(minute), water_level_m: level, sample_count: 3 }
    }

    #[test]
    fn test_matching_timestamps_carry_tidal_level() {
        let joined = left_join(&[well(0, 0.5), well(15, 0.6)], &[tide(0, 1.0), tide(15, 1.1)]);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].tidal_level_m, Some(1.0));
        assert_eq!(joined[1].tidal_level_m, Some(1.1));
        assert_eq!(count_unmatched(&joined), 0);
    }

    #[test]
    fn test_unmatched_timestamps_have_absent_tide() {
        let joined = left_join(&[well(0, 0.5), well(30, 0.7)], &[tide(0, 1.0), tide(15, 1.1)]);
        assert_eq!(joined.len(), 2, "left join keeps every well reading");
        assert_eq!(joined[1].tidal_level_m, None);
        assert_eq!(joined[1].well_level_m, 0.7);
        assert_eq!(count_unmatched(&joined), 1);
    }

    #[test]
    fn test_tide_only_buckets_do_not_appear() {
        let joined = left_join(&[well(15, 0.6)], &[tide(0, 1.0), tide(15, 1.1), tide(30, 1.2)]);
        assert_eq!(joined.len(), 1);
    }
}
