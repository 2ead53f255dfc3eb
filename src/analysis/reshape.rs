/// Wide-to-tidy conversion of the well table.
///
/// Downstream stages handle every well the same way, so the one-column-per-
/// well export is flattened into (well, timestamp, level) rows. Null cells
/// are dropped here, which means different wells may cover different
/// timestamps afterwards. Wells the registry marks as fill-contaminated are
/// dropped as well.

use crate::model::{WellLevel, WellTable};
use crate::wells::is_analysed;

/// Flattens the wide table, keeping non-null readings of analysed wells.
///
/// Rows come out grouped by well (in column order) and ordered by time
/// within each well.
pub fn to_long(table: &WellTable) -> Vec<WellLevel> {
    let mut levels = Vec::new();

    for (col, well_id) in table.well_ids.iter().enumerate() {
        if !is_analysed(well_id) {
            continue;
        }

        levels.extend(table.rows.iter().filter_map(|row| {
            row.levels
                .get(col)
                .copied()
                .flatten()
                .map(|water_level_m| WellLevel {
                    well_id: well_id.clone(),
                    timestamp: row.timestamp,
                    water_level_m,
                })
        }));
    }

    levels
}
