/// End-to-end run of the analysis over synthetic exports
///
/// These tests verify:
/// 1. Both exports load, the cutoff is applied and the fill well is dropped
/// 2. Known tidal delays are recovered as lags
/// 3. The semidiurnal period and Fourier bin are found
/// 4. Conductivity, the t-test, the JSON summary and the figures are produced
///
/// The tide is a 12-hour cosine sampled every 6 minutes; each well repeats it
/// with its own delay and damping on a 15-minute clock. Ten days after the
/// cutoff give 960 samples per well, so the tide sits exactly on Fourier bin 20.
///
/// Run with: cargo test --test pipeline_integration

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use tidemon_analysis::config::{AnalysisConfig, parse_config};
use tidemon_analysis::model::AnalysisError;
use tidemon_analysis::pipeline::{self, AnalysisReport};
use tidemon_analysis::report::{plots, tables};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const PERIOD_MIN: f64 = 720.0;
const FORMAT: &str = "%m/%d/%Y %H:%M";

/// (well, delay in minutes, amplitude)
const COUPLED: &[(&str, i64, f64)] = &[
    ("MW-1", 120, 0.40),
    ("MW-2", 180, 0.30),
    ("MW-3", 240, 0.20),
    ("MW-5", 300, 0.12),
];

fn start() -> NaiveDateTime {
    // Twelve hours of logger warm-up ahead of the 07/01/2019 cutoff.
    NaiveDate::from_ymd_opt(2019, 6, 30)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn tide_at(minutes: f64) -> f64 {
    1.5 + 0.8 * (2.0 * PI * minutes / PERIOD_MIN).cos()
}

fn write_tides(path: &Path) {
    let mut text = String::from("Date Time,Water Level,Sigma,Quality\n");
    // 10.5 days of 6-minute readings, a few still preliminary.
    for i in 0..=2520 {
        let minutes = i as f64 * 6.0;
        let ts = start() + Duration::minutes(i * 6);
        let quality = if i % 500 == 0 { "p" } else { "v" };
        text.push_str(&format!(
            "{},{:.4},0.002,{}\n",
            ts.format(FORMAT),
            tide_at(minutes),
            quality
        ));
    }
    fs::write(path, text).unwrap();
}

fn write_wells(path: &Path) {
    let mut text = String::from("Date Time,MW-1,MW-2,MW-3,MW-4,MW-5,MW-6,Logger Temp\n");
    // Warm-up rows plus exactly 960 rows from the cutoff on.
    for i in 0..(48 + 960) {
        let minutes = i as f64 * 15.0;
        let ts = start() + Duration::minutes(i * 15);
        let mut row = ts.format(FORMAT).to_string();

        for &(_, delay, amplitude) in &COUPLED[..3] {
            let level = 0.9 + amplitude * (2.0 * PI * (minutes - delay as f64) / PERIOD_MIN).cos();
            row.push_str(&format!(",{:.5}", level));
        }

        // Fill-contaminated well: junk that would break the analysis if read.
        row.push_str(if i % 7 == 0 { ",NA" } else { ",99.0" });

        let (_, delay, amplitude) = COUPLED[3];
        let level = 0.9 + amplitude * (2.0 * PI * (minutes - delay as f64) / PERIOD_MIN).cos();
        row.push_str(&format!(",{:.5}", level));

        // Inland well: weak, late response with a logger gap.
        if (300..310).contains(&i) {
            row.push(',');
        } else {
            let level = 2.1 + 0.02 * (2.0 * PI * (minutes - 360.0) / PERIOD_MIN).cos();
            row.push_str(&format!(",{:.5}", level));
        }

        row.push_str(",18.4\n");
        text.push_str(&row);
    }
    fs::write(path, text).unwrap();
}

fn test_config(dir: &TempDir) -> AnalysisConfig {
    let tides = dir.path().join("tides.csv");
    let wells = dir.path().join("wells.csv");
    write_tides(&tides);
    write_wells(&wells);

    // Ten days only reach bin ~20, not the field range of a long record.
    let text = format!(
        r#"
[input]
tidal_csv = "{}"
wells_csv = "{}"

[analysis]
fft_bins = [15, 25]

[output]
directory = "{}"
histogram_bins = 20
"#,
        tides.display(),
        wells.display(),
        dir.path().join("out").display()
    );
    parse_config(&text).unwrap()
}

fn run(dir: &TempDir) -> (AnalysisConfig, AnalysisReport) {
    let config = test_config(dir);
    let report = pipeline::run(&config).expect("pipeline should succeed");
    (config, report)
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

#[test]
fn test_cutoff_and_fill_well_exclusion() {
    let dir = TempDir::new().unwrap();
    let (_, report) = run(&dir);

    assert_eq!(report.tidal_readings, 2521);
    assert_eq!(report.unverified_tidal_readings, 6);

    assert!(!report.series.contains_key("MW-4"));
    assert!(!report.lags.contains_key("MW-4"));
    assert_eq!(
        report.series.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["MW-1", "MW-2", "MW-3", "MW-5", "MW-6"]
    );

    // Four complete wells plus MW-6 with its ten-row gap, all after the cutoff.
    assert_eq!(report.joined_records, 4 * 960 + 950);
    assert_eq!(report.unmatched_records, 0);
    for series in report.series.values() {
        assert_eq!(series[0].timestamp.format(FORMAT).to_string(), "07/01/2019 00:00");
    }
}

// ---------------------------------------------------------------------------
// Lag, period and Fourier coefficient
// ---------------------------------------------------------------------------

#[test]
fn test_known_delays_are_recovered() {
    let dir = TempDir::new().unwrap();
    let (_, report) = run(&dir);

    for &(well, delay, _) in COUPLED {
        let lag = &report.lags[well];
        assert_eq!(lag.lag_minutes, delay as f64, "lag for {}", well);
        assert_eq!(lag.lag_steps as i64 * 15, delay);
        assert!(lag.correlation > 0.95, "{} r = {}", well, lag.correlation);
    }
    assert_eq!(report.lags["MW-6"].lag_minutes, 360.0);
}

#[test]
fn test_semidiurnal_period_and_fourier_bin() {
    let dir = TempDir::new().unwrap();
    let (_, report) = run(&dir);

    // Only tidally coupled wells reach the spectral stages.
    assert_eq!(report.spectral_peaks.len(), 4);
    assert!(!report.spectral_peaks.contains_key("MW-6"));
    assert_eq!(report.fourier.len(), 4);

    for &(well, _, amplitude) in COUPLED {
        let peak = &report.spectral_peaks[well];
        assert!((peak.period_minutes - PERIOD_MIN).abs() < 1e-6, "{} period {}", well, peak.period_minutes);

        let fft = &report.fourier[well];
        assert_eq!(fft.bin, 20);
        assert_eq!(fft.series_len, 960);
        assert!((fft.one_sided_amplitude() - amplitude).abs() < 1e-3, "{} amplitude", well);
    }

    // Amplitude decays inland.
    assert!(report.fourier["MW-1"].max_amplitude > report.fourier["MW-5"].max_amplitude);
}

// ---------------------------------------------------------------------------
// Conductivity and significance
// ---------------------------------------------------------------------------

#[test]
fn test_conductivity_and_t_test() {
    let dir = TempDir::new().unwrap();
    let (_, report) = run(&dir);

    assert_eq!(report.conductivity.len(), 4);
    for record in report.conductivity.values() {
        assert!(record.conductivity.is_finite() && record.conductivity > 0.0);
        assert!(record.tidal_efficiency > 0.0 && record.tidal_efficiency < 1.0);
        assert_eq!(record.period_minutes, report.spectral_peaks[&record.well_id].period_minutes);
    }

    let t = &report.t_test;
    assert!(t.degrees_of_freedom > 0.0);
    assert!((0.0..=1.0).contains(&t.p_value));
    let mean: f64 = report.conductivity.values().map(|r| r.conductivity).sum::<f64>() / 4.0;
    assert!((t.mean_computed - mean).abs() < 1e-9 * mean.abs().max(1.0));
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[test]
fn test_summary_and_figures_are_written() {
    let dir = TempDir::new().unwrap();
    let (config, report) = run(&dir);

    let text = tables::format_tables(&report);
    assert!(text.contains("MW-1"));
    assert!(!text.contains("MW-4"));
    assert!(text.contains("Nearest-shore well in beach sand"));

    let summary = tables::write_summary_json(&report, &config.output.directory).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(json["lags"]["MW-1"]["lag_minutes"], 120.0);
    assert!(json.get("series").is_none());

    let written =
        plots::render_all(&report, &config.output, config.analysis.period_band_minutes).unwrap();
    // hist + qq + timeseries for five wells, four periodograms, two scatters.
    assert_eq!(written.len(), 5 * 3 + 4 + 2);
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
    }
    assert!(config.output.directory.join("periodogram_MW-3.svg").exists());
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn test_missing_export_aborts_run() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.input.wells_csv = dir.path().join("absent.csv");

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, AnalysisError::Io(_)));
}

#[test]
fn test_fourier_range_beyond_record_aborts_run() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.analysis.fft_bins = [770, 870];

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData(_)));
}

#[test]
fn test_logger_gap_in_coupled_well_aborts_run() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    // Twelve hours of MW-2 readings lost after the cutoff.
    let text = fs::read_to_string(&config.input.wells_csv).unwrap();
    let lines: Vec<String> = text
        .lines()
        .enumerate()
        .map(|(line, row)| {
            let mut cells: Vec<&str> = row.split(',').collect();
            if (1 + 100..1 + 148).contains(&line) {
                cells[2] = "NA";
            }
            cells.join(",")
        })
        .collect();
    fs::write(&config.input.wells_csv, lines.join("\n") + "\n").unwrap();

    let err = pipeline::run(&config).unwrap_err();
    assert!(
        matches!(err, AnalysisError::MissingValues { count: 48, ref well } if well == "MW-2"),
        "unexpected error: {}",
        err
    );
}
