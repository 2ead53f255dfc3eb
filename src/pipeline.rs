/// The analysis run, start to finish.
///
/// Stages run strictly in order and each consumes the whole output of the
/// previous one. The first error aborts the run; there are no partial
/// results.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::conductivity::conductivity_table;
use crate::analysis::fourier::tidal_coefficient;
use crate::analysis::groupings::{group_by_well, regular_levels};
use crate::analysis::join::{count_unmatched, left_join};
use crate::analysis::lag::estimate_lag;
use crate::analysis::resample::resample_tidal;
use crate::analysis::reshape::to_long;
use crate::analysis::significance::welch_t_test;
use crate::analysis::spectrum::{Spectrum, dominant_period};
use crate::config::AnalysisConfig;
use crate::ingest::tidal::{count_unverified, load_tidal_csv};
use crate::ingest::wells::load_wells_csv;
use crate::logging::{self, Stage, log_stage_summary};
use crate::model::{
    AnalysisError, ConductivityRecord, FftResult, JoinedRecord, LagResult, SpectralPeak,
    TTestResult,
};
use crate::wells::tidally_coupled_well_ids;

/// Everything a run produces. The per-well series and spectra are kept for
/// plotting but left out of the JSON summary.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub tidal_readings: usize,
    pub unverified_tidal_readings: usize,
    pub joined_records: usize,
    pub unmatched_records: usize,
    pub lags: BTreeMap<String, LagResult>,
    pub spectral_peaks: BTreeMap<String, SpectralPeak>,
    pub conductivity: BTreeMap<String, ConductivityRecord>,
    pub t_test: TTestResult,
    pub fourier: BTreeMap<String, FftResult>,
    #[serde(skip)]
    pub series: BTreeMap<String, Vec<JoinedRecord>>,
    #[serde(skip)]
    pub spectra: BTreeMap<String, Spectrum>,
}

pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport, AnalysisError> {
    let input = &config.input;
    let params = &config.analysis;
    let offset = config.offset()?;
    let cutoff = config.cutoff()?;

    // Load
    let tidal = load_tidal_csv(&input.tidal_csv, input, offset)?;
    let unverified = count_unverified(&tidal, &input.verified_flag);
    logging::info(
        Stage::Load,
        None,
        &format!("{} tidal readings from {}", tidal.len(), input.tidal_csv.display()),
    );
    if unverified > 0 {
        logging::warn(
            Stage::Load,
            None,
            &format!("{} tidal readings are not flagged '{}'", unverified, input.verified_flag),
        );
    }

    let wells = load_wells_csv(&input.wells_csv, input, offset, cutoff)?;
    logging::info(
        Stage::Load,
        None,
        &format!(
            "{} well rows at or after {} for {} wells",
            wells.rows.len(),
            cutoff,
            wells.well_ids.len()
        ),
    );

    // Align
    let resampled = resample_tidal(&tidal, params.sample_interval_minutes)?;
    logging::info(
        Stage::Resample,
        None,
        &format!("{} tidal buckets of {} minutes", resampled.len(), params.sample_interval_minutes),
    );

    let joined = left_join(&to_long(&wells), &resampled);
    let unmatched = count_unmatched(&joined);
    logging::info(
        Stage::Join,
        None,
        &format!("{} joined records, {} without a tidal bucket", joined.len(), unmatched),
    );
    let series = group_by_well(&joined);

    // Lag
    let mut lags = BTreeMap::new();
    for (well_id, records) in &series {
        let lag = estimate_lag(well_id, records, params.max_lag_steps, params.sample_interval_minutes)?;
        logging::debug(
            Stage::Lag,
            Some(well_id),
            &format!("lag {} min (r = {:.3})", lag.lag_minutes, lag.correlation),
        );
        lags.insert(well_id.clone(), lag);
    }
    log_stage_summary(Stage::Lag, series.len(), lags.len());

    // Spectrum
    let coupled: Vec<&str> = tidally_coupled_well_ids()
        .into_iter()
        .filter(|id| series.contains_key(*id))
        .collect();

    let mut spectral_peaks = BTreeMap::new();
    let mut spectra = BTreeMap::new();
    for &well_id in &coupled {
        let values = regular_levels(well_id, &series[well_id], params.sample_interval_minutes)?;
        let (peak, spectrum) = dominant_period(
            well_id,
            &values,
            params.sample_interval_minutes as f64,
            params.spectral_span,
            params.period_band_minutes,
        )?;
        logging::debug(
            Stage::Spectrum,
            Some(well_id),
            &format!("dominant period {:.1} min", peak.period_minutes),
        );
        spectral_peaks.insert(well_id.to_string(), peak);
        spectra.insert(well_id.to_string(), spectrum);
    }
    log_stage_summary(Stage::Spectrum, coupled.len(), spectral_peaks.len());

    // Conductivity and significance
    let conductivity = conductivity_table(&lags, &spectral_peaks, &config.constants)?;
    for record in conductivity.values() {
        if record.lag_minutes == 0.0 {
            logging::warn(
                Stage::Conductivity,
                Some(&record.well_id),
                "zero lag, conductivity is unbounded",
            );
        }
    }
    log_stage_summary(Stage::Conductivity, coupled.len(), conductivity.len());

    let computed: Vec<f64> = conductivity.values().map(|r| r.conductivity).collect();
    let field: Vec<f64> = conductivity.values().map(|r| r.field_conductivity).collect();
    let t_test = welch_t_test(&computed, &field)?;
    logging::info(
        Stage::TTest,
        None,
        &format!(
            "t = {:.3}, df = {:.2}, p = {:.4}",
            t_test.statistic, t_test.degrees_of_freedom, t_test.p_value
        ),
    );

    // Fourier
    let mut fourier = BTreeMap::new();
    for &well_id in &coupled {
        let values = regular_levels(well_id, &series[well_id], params.sample_interval_minutes)?;
        let result = tidal_coefficient(well_id, &values, params.fft_bins)?;
        logging::debug(
            Stage::Fft,
            Some(well_id),
            &format!(
                "bin {} amplitude {:.4} phase {:.3} rad",
                result.bin, result.max_amplitude, result.phase_rad
            ),
        );
        fourier.insert(well_id.to_string(), result);
    }
    log_stage_summary(Stage::Fft, coupled.len(), fourier.len());

    Ok(AnalysisReport {
        tidal_readings: tidal.len(),
        unverified_tidal_readings: unverified,
        joined_records: joined.len(),
        unmatched_records: unmatched,
        lags,
        spectral_peaks,
        conductivity,
        t_test,
        fourier,
        series,
        spectra,
    })
}
