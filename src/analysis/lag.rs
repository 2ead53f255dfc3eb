/// Cross-correlation lag between a well and the tide.
///
/// The coefficient at lag k compares the well level at `t + k·Δ` with the
/// tidal level at `t`, so a positive lag means the well responds after the
/// tide. Only lags `0..=max_lag_steps` are tried: a well leading the ocean
/// is not physical here.
///
/// The estimator follows the biased sample cross-correlation: means and
/// standard deviations come from the complete (well, tide) pairs, and every
/// lag's covariance sum is divided by the number of complete pairs at lag 0.
/// Pairs are matched by timestamp, so gaps in either series shorten the sum
/// instead of shifting it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset};

use crate::model::{AnalysisError, JoinedRecord, LagResult};

/// Correlation coefficients for lags `0..=max_lag_steps`.
pub fn cross_correlation(
    series: &[JoinedRecord],
    max_lag_steps: usize,
    interval_minutes: i64,
) -> Result<Vec<f64>, AnalysisError> {
    let pairs: Vec<(DateTime<FixedOffset>, f64, f64)> = series
        .iter()
        .filter_map(|r| r.tidal_level_m.map(|tide| (r.timestamp, r.well_level_m, tide)))
        .collect();

    let well_id = series.first().map(|r| r.well_id.as_str()).unwrap_or("?");
    if pairs.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "well {} has {} paired well/tide readings",
            well_id,
            pairs.len()
        )));
    }

    let n = pairs.len() as f64;
    let mean_well = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let mean_tide = pairs.iter().map(|p| p.2).sum::<f64>() / n;
    let sd_well = (pairs.iter().map(|p| (p.1 - mean_well).powi(2)).sum::<f64>() / n).sqrt();
    let sd_tide = (pairs.iter().map(|p| (p.2 - mean_tide).powi(2)).sum::<f64>() / n).sqrt();

    if sd_well == 0.0 || sd_tide == 0.0 {
        return Err(AnalysisError::InsufficientData(format!(
            "well {} has a constant well or tide series",
            well_id
        )));
    }

    let well_by_time: HashMap<DateTime<FixedOffset>, f64> =
        series.iter().map(|r| (r.timestamp, r.well_level_m)).collect();

    let coefficients = (0..=max_lag_steps)
        .map(|k| {
            let shift = Duration::minutes(interval_minutes * k as i64);
            let covariance: f64 = pairs
                .iter()
                .filter_map(|&(t, _, tide)| {
                    well_by_time
                        .get(&(t + shift))
                        .map(|&well| (well - mean_well) * (tide - mean_tide))
                })
                .sum();
            covariance / n / (sd_well * sd_tide)
        })
        .collect();

    Ok(coefficients)
}

/// Index of the largest coefficient; the smallest lag wins ties.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Lag of maximum correlation for one well, in steps and minutes.
pub fn estimate_lag(
    well_id: &str,
    series: &[JoinedRecord],
    max_lag_steps: usize,
    interval_minutes: i64,
) -> Result<LagResult, AnalysisError> {
    let coefficients = cross_correlation(series, max_lag_steps, interval_minutes)?;
    let lag_steps = argmax_first(&coefficients).ok_or_else(|| {
        AnalysisError::InsufficientData(format!("well {} has no finite correlation", well_id))
    })?;

    Ok(LagResult {
        well_id: well_id.to_string(),
        lag_steps,
        lag_minutes: (lag_steps as i64 * interval_minutes) as f64,
        correlation: coefficients[lag_steps],
    })
}
