/// Tidal aquifer analysis.
///
/// Aligns tidal gauge and monitoring-well water levels and derives the
/// tidal lag, semidiurnal period, Jacob–Ferris hydraulic conductivity and
/// Fourier amplitude/phase for each well. `pipeline::run` executes the whole
/// analysis; `report` renders its output.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod wells;
