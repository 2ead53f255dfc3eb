/// SVG figures for the report.
///
/// One file per figure under the output directory:
///   - `hist_<well>.svg`        water-level histogram
///   - `qq_<well>.svg`          normal Q-Q plot
///   - `timeseries_<well>.svg`  first days of well and tidal levels
///   - `periodogram_<well>.svg` smoothed spectral density vs period
///   - `amplitude_vs_distance.svg`, `phase_vs_distance.svg`

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::analysis::groupings::well_levels;
use crate::analysis::spectrum::Spectrum;
use crate::config::OutputConfig;
use crate::logging::{self, Stage};
use crate::model::{AnalysisError, JoinedRecord};
use crate::pipeline::AnalysisReport;
use crate::wells::find_well;

const SIZE: (u32, u32) = (900, 560);
const FONT: &str = "sans-serif";

fn render_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::Render(e.to_string())
}

/// Axis range covering `values` with 5% padding; a flat series gets ±1.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !min.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Standard normal quantile (Acklam's rational approximation, |error| < 1.2e-9).
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -normal_quantile(1.0 - p)
    }
}

/// (theoretical, sample) pairs for a normal Q-Q plot, using the
/// `(i - 0.5) / n` plotting positions.
pub fn qq_points(values: &[f64]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, v)| (normal_quantile((i as f64 + 0.5) / n), v))
        .collect()
}

/// Equal-width bin counts over the padded range of `values`.
pub fn histogram_counts(values: &[f64], bins: usize) -> (Range<f64>, Vec<usize>) {
    let range = padded_range(values.iter().copied());
    let bins = bins.max(1);
    let width = (range.end - range.start) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = (((v - range.start) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (range, counts)
}

pub fn plot_histogram(
    path: &Path,
    well_id: &str,
    values: &[f64],
    bins: usize,
) -> Result<(), AnalysisError> {
    let (range, counts) = histogram_counts(values, bins);
    let width = (range.end - range.start) / counts.len() as f64;
    let y_max = counts.iter().copied().max().unwrap_or(0).max(1) as f64 * 1.05;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} water level distribution", well_id), (FONT, 22).into_font())
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(range.clone(), 0.0..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Water level (m)")
        .y_desc("Count")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = range.start + i as f64 * width;
            Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], BLUE.mix(0.6).filled())
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

pub fn plot_qq(path: &Path, well_id: &str, values: &[f64]) -> Result<(), AnalysisError> {
    let points = qq_points(values);
    let x_range = padded_range(points.iter().map(|p| p.0));
    let y_range = padded_range(points.iter().map(|p| p.1));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} normal Q-Q", well_id), (FONT, 22).into_font())
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Theoretical quantile")
        .y_desc("Water level (m)")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 2, BLUE.filled())))
        .map_err(render_err)?;

    // Reference line through the quartiles.
    if points.len() >= 4 {
        let (q1, q3) = (points[points.len() / 4], points[3 * points.len() / 4]);
        if q3.0 > q1.0 {
            let slope = (q3.1 - q1.1) / (q3.0 - q1.0);
            let (x0, x1) = (points[0].0, points[points.len() - 1].0);
            chart
                .draw_series(LineSeries::new(
                    [x0, x1].map(|x| (x, q1.1 + slope * (x - q1.0))),
                    &RED,
                ))
                .map_err(render_err)?;
        }
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// Well and tidal levels over the first `days` of the series, x in hours.
pub fn plot_timeseries(
    path: &Path,
    well_id: &str,
    series: &[JoinedRecord],
    days: i64,
) -> Result<(), AnalysisError> {
    let Some(first) = series.first() else {
        return Ok(());
    };
    let start = first.timestamp;
    let end = start + chrono::Duration::days(days);
    let hours = |r: &JoinedRecord| (r.timestamp - start).num_minutes() as f64 / 60.0;

    let window: Vec<&JoinedRecord> = series.iter().filter(|r| r.timestamp < end).collect();
    let well: Vec<(f64, f64)> = window.iter().map(|&r| (hours(r), r.well_level_m)).collect();
    let tide: Vec<(f64, f64)> = window
        .iter()
        .filter_map(|&r| r.tidal_level_m.map(|t| (hours(r), t)))
        .collect();

    let x_range = padded_range(well.iter().map(|p| p.0));
    let y_range = padded_range(well.iter().chain(&tide).map(|p| p.1));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} and tide from {}", well_id, start.format("%Y-%m-%d %H:%M")), (FONT, 22).into_font())
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Hours")
        .y_desc("Water level (m)")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(tide, &RED))
        .map_err(render_err)?
        .label("tide")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    chart
        .draw_series(LineSeries::new(well, &BLUE))
        .map_err(render_err)?
        .label(well_id)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Spectral density against period, out to three times the upper band
/// edge so the diurnal line is visible next to the semidiurnal one.
pub fn plot_periodogram(
    path: &Path,
    well_id: &str,
    spectrum: &Spectrum,
    band: [f64; 2],
) -> Result<(), AnalysisError> {
    let limit = band[1] * 3.0;
    let points: Vec<(f64, f64)> = spectrum
        .periods_minutes
        .iter()
        .zip(&spectrum.density)
        .filter(|(p, _)| **p <= limit)
        .map(|(&p, &d)| (p, d))
        .collect();

    let y_range = padded_range(points.iter().map(|p| p.1));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} smoothed periodogram", well_id), (FONT, 22).into_font())
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..limit, y_range.clone())
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Period (min)")
        .y_desc("Spectral density")
        .draw()
        .map_err(render_err)?;

    // Search band
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(band[0], y_range.start), (band[1], y_range.end)],
            RED.mix(0.1).filled(),
        )))
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(points, &BLUE))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Labelled scatterplot of one value per well.
pub fn plot_scatter(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(String, f64, f64)],
) -> Result<(), AnalysisError> {
    let x_range = padded_range(points.iter().map(|p| p.1));
    let y_range = padded_range(points.iter().map(|p| p.2));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 22).into_font())
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(points.iter().map(|(_, x, y)| Circle::new((*x, *y), 5, BLUE.filled())))
        .map_err(render_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(label, x, y)| Text::new(label.clone(), (*x, *y), (FONT, 14).into_font())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Renders every figure for a finished run. Returns the files written.
pub fn render_all(report: &AnalysisReport, output: &OutputConfig, band: [f64; 2]) -> Result<Vec<PathBuf>, AnalysisError> {
    let dir = &output.directory;
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for (well_id, series) in &report.series {
        let levels = well_levels(series);

        let path = dir.join(format!("hist_{}.svg", well_id));
        plot_histogram(&path, well_id, &levels, output.histogram_bins)?;
        written.push(path);

        let path = dir.join(format!("qq_{}.svg", well_id));
        plot_qq(&path, well_id, &levels)?;
        written.push(path);

        let path = dir.join(format!("timeseries_{}.svg", well_id));
        plot_timeseries(&path, well_id, series, output.timeseries_days)?;
        written.push(path);
    }

    for (well_id, spectrum) in &report.spectra {
        let path = dir.join(format!("periodogram_{}.svg", well_id));
        plot_periodogram(&path, well_id, spectrum, band)?;
        written.push(path);
    }

    if !report.fourier.is_empty() {
        let distance = |id: &str| find_well(id).map(|w| w.shoreline_distance_m).unwrap_or(f64::NAN);

        let amplitude: Vec<(String, f64, f64)> = report
            .fourier
            .values()
            .map(|f| (f.well_id.clone(), distance(&f.well_id), f.max_amplitude))
            .collect();
        let path = dir.join("amplitude_vs_distance.svg");
        plot_scatter(&path, "Tidal amplitude vs distance", "Distance from shore (m)", "Amplitude (m)", &amplitude)?;
        written.push(path);

        let phase: Vec<(String, f64, f64)> = report
            .fourier
            .values()
            .map(|f| (f.well_id.clone(), distance(&f.well_id), f.phase_rad))
            .collect();
        let path = dir.join("phase_vs_distance.svg");
        plot_scatter(&path, "Tidal phase vs distance", "Distance from shore (m)", "Phase (rad)", &phase)?;
        written.push(path);
    }

    logging::info(
        Stage::Plot,
        None,
        &format!("{} figures written to {}", written.len(), dir.display()),
    );
    Ok(written)
}
