/// Smoothed periodogram and the semidiurnal spectral peak.
///
/// The estimate mirrors the classic smoothed-periodogram recipe: remove the
/// mean and linear trend, taper 10% of each end with a split cosine bell,
/// take |FFT|², then smooth with a modified Daniell kernel. Frequencies are
/// in cycles per sample, so a bin's period in minutes is
/// `interval / frequency`.

use rustfft::{FftPlanner, num_complex::Complex};
use serde::Serialize;
use std::f64::consts::PI;

use crate::model::{AnalysisError, SpectralPeak};

/// Proportion of the series tapered at each end.
const TAPER_PROPORTION: f64 = 0.1;

/// Smoothed spectral density from the first Fourier bin up to Nyquist.
#[derive(Debug, Clone, Serialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub periods_minutes: Vec<f64>,
    pub density: Vec<f64>,
}

/// Removes the least-squares line through `values` (index as abscissa).
pub fn detrend(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let t_mean = (n - 1.0) / 2.0;
    let x_mean = values.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, &x) in values.iter().enumerate() {
        let dt = i as f64 - t_mean;
        sxy += dt * (x - x_mean);
        sxx += dt * dt;
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };

    values
        .iter()
        .enumerate()
        .map(|(i, &x)| x - x_mean - slope * (i as f64 - t_mean))
        .collect()
}

/// Applies a split cosine bell to `proportion` of each end, in place.
pub fn split_cosine_taper(values: &mut [f64], proportion: f64) {
    let n = values.len();
    let m = (n as f64 * proportion).floor() as usize;
    for i in 1..=m {
        let w = 0.5 * (1.0 - (PI * (2 * i - 1) as f64 / (2 * m) as f64).cos());
        values[i - 1] *= w;
        values[n - i] *= w;
    }
}

/// Modified Daniell kernel weights for a smoothing span, centre first.
///
/// A span of `s` gives half-width `m = s / 2`; interior weights are
/// `1/(2m)` and the two end weights `1/(4m)`. Spans below 2 mean no
/// smoothing.
pub fn modified_daniell(span: usize) -> Vec<f64> {
    let m = span / 2;
    if m == 0 {
        return vec![1.0];
    }
    (0..=m)
        .map(|j| if j == m { 1.0 / (4 * m) as f64 } else { 1.0 / (2 * m) as f64 })
        .collect()
}

/// Smoothed periodogram of a complete series.
pub fn smoothed_periodogram(
    values: &[f64],
    interval_minutes: f64,
    span: usize,
) -> Result<Spectrum, AnalysisError> {
    let n = values.len();
    if n < 4 {
        return Err(AnalysisError::InsufficientData(format!(
            "periodogram needs at least 4 samples, got {}",
            n
        )));
    }

    let mut x = detrend(values);
    split_cosine_taper(&mut x, TAPER_PROPORTION);
    // Mean of the squared taper weights, compensates the tapered energy.
    let u2 = 1.0 - (5.0 / 8.0) * TAPER_PROPORTION * 2.0;

    let mut buffer: Vec<Complex<f64>> = x.iter().map(|&v| Complex::new(v, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    let mut raw: Vec<f64> = buffer
        .iter()
        .map(|c| c.norm_sqr() / (n as f64 * u2))
        .collect();
    // Zero-frequency bin is empty after detrending.
    raw[0] = 0.5 * (raw[1] + raw[n - 1]);

    let kernel = modified_daniell(span);
    let m = kernel.len() as isize - 1;
    let smoothed: Vec<f64> = (0..n as isize)
        .map(|i| {
            (-m..=m)
                .map(|j| kernel[j.unsigned_abs()] * raw[(i + j).rem_euclid(n as isize) as usize])
                .sum()
        })
        .collect();

    let bins = 1..=n / 2;
    Ok(Spectrum {
        frequencies: bins.clone().map(|k| k as f64 / n as f64).collect(),
        periods_minutes: bins.clone().map(|k| interval_minutes * n as f64 / k as f64).collect(),
        density: bins.map(|k| smoothed[k]).collect(),
    })
}

impl Spectrum {
    /// Index of the densest bin whose period lies inside `band` (inclusive).
    /// Ties go to the lowest frequency.
    pub fn peak_in_band(&self, band: [f64; 2]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &period) in self.periods_minutes.iter().enumerate() {
            if period < band[0] || period > band[1] {
                continue;
            }
            match best {
                Some(b) if self.density[i] <= self.density[b] => {}
                _ => best = Some(i),
            }
        }
        best
    }
}

/// Dominant period of a well series within the tidal band.
///
/// Returns the full spectrum alongside the peak for the periodogram plot.
pub fn dominant_period(
    well_id: &str,
    values: &[f64],
    interval_minutes: f64,
    span: usize,
    band: [f64; 2],
) -> Result<(SpectralPeak, Spectrum), AnalysisError> {
    let missing = values.iter().filter(|v| v.is_nan()).count();
    if missing > 0 {
        return Err(AnalysisError::MissingValues { well: well_id.to_string(), count: missing });
    }

    let spectrum = smoothed_periodogram(values, interval_minutes, span)?;
    let idx = spectrum.peak_in_band(band).ok_or_else(|| {
        AnalysisError::InsufficientData(format!(
            "well {}: no spectral bin with period in [{}, {}] minutes",
            well_id, band[0], band[1]
        ))
    })?;

    let peak = SpectralPeak {
        well_id: well_id.to_string(),
        period_minutes: spectrum.periods_minutes[idx],
        frequency: spectrum.frequencies[idx],
        density: spectrum.density[idx],
    };
    Ok((peak, spectrum))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 days of 15-minute samples.
    const TEN_DAYS: usize = 960;

    fn tidal_well(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                0.35 * (2.0 * PI * t / 48.0 + 0.4).sin()      // 12 h
                    + 0.08 * (2.0 * PI * t / 96.0).sin()      // 24 h
                    + 0.0004 * t                              // drift
                    + 1.2
            })
            .collect()
    }

    #[test]
    fn test_detrend_removes_line() {
        let line: Vec<f64> = (0..10).map(|i| 2.0 + 0.5 * i as f64).collect();
        assert!(detrend(&line).iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_taper_leaves_middle_untouched() {
        let mut values = vec![1.0; 20];
        split_cosine_taper(&mut values, 0.1);
        assert!(values[0] < 1.0 && values[19] < 1.0);
        assert_eq!(values[0], values[19]);
        assert!(values[2..18].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_modified_daniell_weights_sum_to_one() {
        assert_eq!(modified_daniell(3), vec![0.5, 0.25]);
        assert_eq!(modified_daniell(1), vec![1.0]);
        let k = modified_daniell(5);
        let total: f64 = k[0] + 2.0 * k[1..].iter().sum::<f64>();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_semidiurnal_peak_near_720_minutes() {
        let (peak, spectrum) =
            dominant_period("MW-1", &tidal_well(TEN_DAYS), 15.0, 3, [650.0, 800.0]).unwrap();

        // Bin spacing around 720 min is ~38 min for a 10-day record.
        let bin_width = 15.0 * TEN_DAYS as f64 / 19.0 - 720.0;
        assert!(
            (peak.period_minutes - 720.0).abs() <= bin_width,
            "period {} not within one bin of 720",
            peak.period_minutes
        );
        assert_eq!(spectrum.frequencies.len(), TEN_DAYS / 2);
    }

    #[test]
    fn test_missing_values_abort() {
        let mut values = tidal_well(200);
        values[17] = f64::NAN;
        let err = dominant_period("MW-1", &values, 15.0, 3, [650.0, 800.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingValues { count: 1, .. }));
    }

    #[test]
    fn test_short_series_has_no_band_bin() {
        // 40 samples cannot resolve a 650-800 minute period.
        let err = dominant_period("MW-1", &tidal_well(40), 15.0, 3, [650.0, 800.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }
}
