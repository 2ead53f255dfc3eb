/// Monitoring well registry for the tidal aquifer study.
///
/// Defines the canonical list of wells whose loggers appear as columns in
/// the well export, along with the field-measured and literature constants
/// the Jacob–Ferris calculation needs. This is the single source of truth for
/// well identifiers; other modules should reference wells from here rather
/// than hardcoding column names.
///
/// Two data-quality decisions live here as flags rather than as computed
/// rules: which well is contaminated by anthropogenic fill, and which wells
/// show no tidal coupling.

// ---------------------------------------------------------------------------
// Well metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitoring well.
pub struct Well {
    /// Column header in the well export, e.g. "MW-1".
    pub id: &'static str,
    /// Human-readable description of the well's setting.
    pub description: &'static str,
    /// Aquifer matrix compressibility α, in m²/N (literature value for the
    /// logged lithology).
    pub compressibility: f64,
    /// Effective porosity n, dimensionless.
    pub porosity: f64,
    /// Distance from the well to the shoreline x, in meters.
    pub shoreline_distance_m: f64,
    /// Hydraulic conductivity from the field slug test, in m/day.
    pub field_conductivity: f64,
    /// Screen is set in anthropogenic fill; excluded from every analysis.
    pub fill_contaminated: bool,
    /// Well responds to the tide. Uncoupled wells are skipped by the
    /// spectral, conductivity and Fourier steps.
    pub tidally_coupled: bool,
}

/// All monitoring wells in the export, ordered by distance from shore.
pub static WELL_REGISTRY: &[Well] = &[
    Well {
        id: "MW-1",
        description: "Nearest-shore well in beach sand; strongest tidal signal.",
        compressibility: 1.0e-7,
        porosity: 0.46,
        shoreline_distance_m: 48.0,
        field_conductivity: 21.3,
        fill_contaminated: false,
        tidally_coupled: true,
    },
    Well {
        id: "MW-2",
        description: "Back-beach well in fine to medium sand.",
        compressibility: 1.0e-7,
        porosity: 0.42,
        shoreline_distance_m: 95.0,
        field_conductivity: 17.8,
        fill_contaminated: false,
        tidally_coupled: true,
    },
    Well {
        id: "MW-3",
        description: "Dune swale well; silty sand below 2 m.",
        compressibility: 5.0e-8,
        porosity: 0.39,
        shoreline_distance_m: 160.0,
        field_conductivity: 9.6,
        fill_contaminated: false,
        tidally_coupled: true,
    },
    Well {
        id: "MW-4",
        description: "Parking-lot well screened in imported fill. Levels \
                      track drainage rather than the aquifer.",
        compressibility: 1.0e-7,
        porosity: 0.35,
        shoreline_distance_m: 210.0,
        field_conductivity: 3.2,
        fill_contaminated: true,
        tidally_coupled: false,
    },
    Well {
        id: "MW-5",
        description: "Inland well at the edge of the marsh.",
        compressibility: 5.0e-8,
        porosity: 0.40,
        shoreline_distance_m: 300.0,
        field_conductivity: 12.4,
        fill_contaminated: false,
        tidally_coupled: true,
    },
    Well {
        id: "MW-6",
        description: "Upland well beyond the tidal influence zone; used as a \
                      background reference only.",
        compressibility: 1.0e-8,
        porosity: 0.33,
        shoreline_distance_m: 480.0,
        field_conductivity: 6.1,
        fill_contaminated: false,
        tidally_coupled: false,
    },
];

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Returns every registered well identifier, in registry order.
pub fn all_well_ids() -> Vec<&'static str> {
    WELL_REGISTRY.iter().map(|w| w.id).collect()
}

/// Returns the identifiers of wells that enter downstream analysis
/// (everything except the fill-contaminated well).
pub fn analysed_well_ids() -> Vec<&'static str> {
    WELL_REGISTRY
        .iter()
        .filter(|w| !w.fill_contaminated)
        .map(|w| w.id)
        .collect()
}

/// Returns the identifiers of analysed wells that respond to the tide.
pub fn tidally_coupled_well_ids() -> Vec<&'static str> {
    WELL_REGISTRY
        .iter()
        .filter(|w| !w.fill_contaminated && w.tidally_coupled)
        .map(|w| w.id)
        .collect()
}

/// Looks up a well by identifier.
pub fn find_well(id: &str) -> Option<&'static Well> {
    WELL_REGISTRY.iter().find(|w| w.id == id)
}

/// Whether a well takes part in the analysis at all.
pub fn is_analysed(id: &str) -> bool {
    find_well(id).is_some_and(|w| !w.fill_contaminated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
