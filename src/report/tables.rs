/// Summary tables for the console and `summary.json`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::AnalysisError;
use crate::pipeline::AnalysisReport;
use crate::wells::{analysed_well_ids, find_well};

const RULE: &str = "═══════════════════════════════════════════════════════════════════════";

/// Renders every summary table as plain text.
pub fn format_tables(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", RULE));
    out.push_str(&format!(
        "Tidal readings: {} ({} unverified) | joined records: {} ({} without tide)\n",
        report.tidal_readings,
        report.unverified_tidal_readings,
        report.joined_records,
        report.unmatched_records
    ));
    out.push_str(&format!("{}\n", RULE));

    out.push_str("\nWells\n");
    for well in analysed_well_ids().into_iter().filter_map(find_well) {
        let coupling = if well.tidally_coupled { "coupled" } else { "uncoupled" };
        out.push_str(&format!(
            "{:<8} {:>6.0} m  {:<10} {}\n",
            well.id, well.shoreline_distance_m, coupling, well.description
        ));
    }

    out.push_str("\nLag (cross-correlation)\n");
    out.push_str(&format!("{:<8} {:>6} {:>10} {:>8}\n", "well", "steps", "lag (min)", "r"));
    for lag in report.lags.values() {
        out.push_str(&format!(
            "{:<8} {:>6} {:>10.0} {:>8.3}\n",
            lag.well_id, lag.lag_steps, lag.lag_minutes, lag.correlation
        ));
    }

    out.push_str("\nDominant period (smoothed periodogram)\n");
    out.push_str(&format!("{:<8} {:>12} {:>12}\n", "well", "period (min)", "density"));
    for peak in report.spectral_peaks.values() {
        out.push_str(&format!(
            "{:<8} {:>12.1} {:>12.4e}\n",
            peak.well_id, peak.period_minutes, peak.density
        ));
    }

    out.push_str("\nJacob–Ferris conductivity\n");
    out.push_str(&format!(
        "{:<8} {:>8} {:>10} {:>10} {:>10} {:>12} {:>12} {:>12}\n",
        "well", "x (m)", "lag", "period", "TE", "Ss (1/m)", "K tidal", "K slug"
    ));
    for r in report.conductivity.values() {
        out.push_str(&format!(
            "{:<8} {:>8.0} {:>10.0} {:>10.1} {:>10.5} {:>12.4e} {:>12.2} {:>12.2}\n",
            r.well_id,
            r.shoreline_distance_m,
            r.lag_minutes,
            r.period_minutes,
            r.tidal_efficiency,
            r.specific_storage,
            r.conductivity,
            r.field_conductivity
        ));
    }

    let t = &report.t_test;
    out.push_str("\nWelch t-test, tidal vs slug-test K\n");
    out.push_str(&format!(
        "mean tidal = {:.2}, mean slug = {:.2}, t = {:.3}, df = {:.2}, p = {:.4}\n",
        t.mean_computed, t.mean_field, t.statistic, t.degrees_of_freedom, t.p_value
    ));

    out.push_str("\nTidal Fourier coefficient\n");
    out.push_str(&format!(
        "{:<8} {:>6} {:>12} {:>12}\n",
        "well", "bin", "amplitude", "phase (rad)"
    ));
    for f in report.fourier.values() {
        out.push_str(&format!(
            "{:<8} {:>6} {:>12.5} {:>12.4}\n",
            f.well_id, f.bin, f.max_amplitude, f.phase_rad
        ));
    }
    out.push_str(&format!("{}\n", RULE));

    out
}

/// Writes the serializable part of the report as pretty JSON.
pub fn write_summary_json(report: &AnalysisReport, dir: &Path) -> Result<PathBuf, AnalysisError> {
    fs::create_dir_all(dir)?;
    let path = dir.join("summary.json");
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| AnalysisError::Io(std::io::Error::other(e)))?;
    writer.flush()?;
    Ok(path)
}
