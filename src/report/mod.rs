/// Human-facing output of an analysis run.
///
/// Submodules:
/// - `tables`: printed summary tables and the JSON summary file.
/// - `plots`: SVG figures for the report.

pub mod plots;
pub mod tables;
