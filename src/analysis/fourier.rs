/// Amplitude and phase of the tidal Fourier coefficient.
///
/// A plain DFT of the well series (no detrending or window), magnitude
/// normalized by the series length. Only a fixed bin range around the
/// expected tidal frequency is searched; comparing the winning amplitude and
/// phase across wells shows how the tide attenuates and shifts with distance
/// from shore.

use rustfft::{FftPlanner, num_complex::Complex};

use crate::model::{AnalysisError, FftResult};

/// Normalized magnitude and phase of every DFT coefficient.
pub fn magnitude_and_phase(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = values.len();
    let mut buffer: Vec<Complex<f64>> = values.iter().map(|&v| Complex::new(v, 0.0)).collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    let magnitudes = buffer.iter().map(|c| c.norm() / n as f64).collect();
    let phases = buffer.iter().map(|c| c.arg()).collect();
    (magnitudes, phases)
}

/// Index of the largest magnitude in `low..=high`; the lowest index wins ties.
pub fn strongest_bin(magnitudes: &[f64], low: usize, high: usize) -> usize {
    let mut bin = low;
    for k in low..=high {
        if magnitudes[k] > magnitudes[bin] {
            bin = k;
        }
    }
    bin
}

/// Strongest coefficient within `bins` (inclusive, clamped to Nyquist).
///
/// The series must be complete. When several bins share the maximum
/// magnitude the lowest bin is reported.
pub fn tidal_coefficient(
    well_id: &str,
    values: &[f64],
    bins: [usize; 2],
) -> Result<FftResult, AnalysisError> {
    let missing = values.iter().filter(|v| !v.is_finite()).count();
    if missing > 0 {
        return Err(AnalysisError::MissingValues { well: well_id.to_string(), count: missing });
    }

    let n = values.len();
    let low = bins[0];
    let high = bins[1].min(n / 2);
    if n == 0 || low > high {
        return Err(AnalysisError::InsufficientData(format!(
            "well {}: {} samples do not reach Fourier bin {}",
            well_id, n, low
        )));
    }

    let (magnitudes, phases) = magnitude_and_phase(values);

    let bin = strongest_bin(&magnitudes, low, high);

    Ok(FftResult {
        well_id: well_id.to_string(),
        bin,
        max_amplitude: magnitudes[bin],
        phase_rad: phases[bin],
        series_len: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn cosine(n: usize, bin: usize, amplitude: f64, phase: f64, offset: f64) -> Vec<f64> {
        (0..n)
            .map(|t| offset + amplitude * (2.0 * PI * bin as f64 * t as f64 / n as f64 + phase).cos())
            .collect()
    }

    #[test]
    fn test_pure_sinusoid_amplitude_and_phase() {
        // 10 days at 15 minutes; bin 20 is a 12-hour period.
        let values = cosine(960, 20, 0.42, 0.7, 1.3);
        let result = tidal_coefficient("MW-1", &values, [15, 25]).unwrap();

        assert_eq!(result.bin, 20);
        assert_eq!(result.series_len, 960);
        assert!((result.max_amplitude - 0.21).abs() < 1e-9);
        assert!((result.one_sided_amplitude() - 0.42).abs() < 1e-9);
        assert!((result.phase_rad - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_dc_offset_outside_range_is_ignored() {
        let values = cosine(960, 20, 0.1, -1.2, 50.0);
        let result = tidal_coefficient("MW-1", &values, [1, 40]).unwrap();
        assert_eq!(result.bin, 20);
        assert!((result.phase_rad + 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_ties_resolve_to_lowest_bin() {
        let magnitudes = [9.0, 0.1, 0.5, 0.2, 0.5, 0.3];
        assert_eq!(strongest_bin(&magnitudes, 1, 5), 2);
        assert_eq!(strongest_bin(&magnitudes, 3, 5), 4);
    }

    #[test]
    fn test_missing_values_abort() {
        let mut values = cosine(960, 20, 0.3, 0.0, 0.0);
        values[100] = f64::NAN;
        values[101] = f64::NAN;
        let err = tidal_coefficient("MW-1", &values, [15, 25]).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingValues { count: 2, .. }));
    }

    #[test]
    fn test_range_beyond_nyquist_is_an_error() {
        let values = cosine(100, 5, 1.0, 0.0, 0.0);
        let err = tidal_coefficient("MW-1", &values, [770, 870]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }
}
