/// Time alignment and statistics for the tidal aquifer analysis.
///
/// Each submodule is one pipeline stage. Per-well stages take the records of
/// a single well and return a single result; `groupings` does the split and
/// the callers merge results back into maps keyed by well identifier.
///
/// Submodules:
/// - `resample`: 6-minute tidal readings → 15-minute bucket means.
/// - `reshape`: wide well table → tidy (well, timestamp, level) rows.
/// - `join`: left join of well rows onto tidal buckets.
/// - `groupings`: splits joined rows into per-well series.
/// - `lag`: cross-correlation lag between well and tide.
/// - `spectrum`: smoothed periodogram and semidiurnal peak.
/// - `conductivity`: Jacob–Ferris tidal-method hydraulic conductivity.
/// - `significance`: Welch t-test of tidal vs slug-test conductivity.
/// - `fourier`: amplitude and phase at the tidal Fourier bin.

pub mod conductivity;
pub mod fourier;
pub mod groupings;
pub mod join;
pub mod lag;
pub mod resample;
pub mod reshape;
pub mod significance;
pub mod spectrum;
