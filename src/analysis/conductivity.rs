/// Jacob–Ferris tidal-method hydraulic conductivity.
///
/// For a well at distance x from the shore, a tidal wave of period P
/// arrives with time lag tL. With tidal efficiency TE = α / (α + nβ) and
/// specific storage Ss = nβγw / (1 − TE), conductivity follows from
///
/// ```text
///     K = Ss · P · x² / (4π · tL²)
/// ```
///
/// computed in m/min and scaled by the configured conversion factor.
/// A zero lag makes K infinite; that is a data defect, not something to
/// paper over here.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::config::PhysicalConstants;
use crate::model::{AnalysisError, ConductivityRecord, LagResult, SpectralPeak};
use crate::wells::find_well;

/// Fraction of the ocean head change transmitted to pore pressure.
pub fn tidal_efficiency(compressibility: f64, porosity: f64, fluid_compressibility: f64) -> f64 {
    compressibility / (compressibility + porosity * fluid_compressibility)
}

pub fn specific_storage(
    porosity: f64,
    fluid_compressibility: f64,
    unit_weight: f64,
    tidal_efficiency: f64,
) -> f64 {
    porosity * fluid_compressibility * unit_weight / (1.0 - tidal_efficiency)
}

pub fn jacob_ferris_conductivity(
    specific_storage: f64,
    period_minutes: f64,
    shoreline_distance_m: f64,
    lag_minutes: f64,
    conversion: f64,
) -> f64 {
    specific_storage * period_minutes * shoreline_distance_m.powi(2)
        / (4.0 * PI * lag_minutes.powi(2))
        * conversion
}

/// Builds the conductivity record for one well from its registry constants
/// and derived lag and period.
pub fn conductivity_record(
    lag: &LagResult,
    peak: &SpectralPeak,
    constants: &PhysicalConstants,
) -> Result<ConductivityRecord, AnalysisError> {
    let well = find_well(&lag.well_id).ok_or_else(|| AnalysisError::UnknownWell(lag.well_id.clone()))?;

    let te = tidal_efficiency(well.compressibility, well.porosity, constants.fluid_compressibility);
    let ss = specific_storage(well.porosity, constants.fluid_compressibility, constants.unit_weight, te);
    let k = jacob_ferris_conductivity(
        ss,
        peak.period_minutes,
        well.shoreline_distance_m,
        lag.lag_minutes,
        constants.conductivity_conversion,
    );

    Ok(ConductivityRecord {
        well_id: lag.well_id.clone(),
        compressibility: well.compressibility,
        porosity: well.porosity,
        shoreline_distance_m: well.shoreline_distance_m,
        field_conductivity: well.field_conductivity,
        lag_minutes: lag.lag_minutes,
        period_minutes: peak.period_minutes,
        tidal_efficiency: te,
        specific_storage: ss,
        conductivity: k,
    })
}

/// Joins lags and spectral peaks by well and computes a record for every
/// well present in both maps.
pub fn conductivity_table(
    lags: &BTreeMap<String, LagResult>,
    peaks: &BTreeMap<String, SpectralPeak>,
    constants: &PhysicalConstants,
) -> Result<BTreeMap<String, ConductivityRecord>, AnalysisError> {
    let mut table = BTreeMap::new();
    for (well_id, peak) in peaks {
        if let Some(lag) = lags.get(well_id) {
            table.insert(well_id.clone(), conductivity_record(lag, peak, constants)?);
        }
    }
    Ok(table)
}
