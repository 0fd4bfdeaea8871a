//! Application constants for the equity merger
//!
//! File naming conventions, source field names, output schema and
//! GeoPackage identifiers used throughout the crate.

// =============================================================================
// Input Files
// =============================================================================

/// Extension of the monthly input layers (compared case-sensitively)
pub const INPUT_EXTENSION: &str = "shp";

/// Pattern every input file name must match in full
///
/// Example: `equity_monthly_dry_01_2014.shp`
pub const FILENAME_PATTERN: &str = r"(?i)^equity_monthly_(dry|wet|transition)_(\d{2})_(\d{4})\.shp$";

/// Source attribute fields read from every input record
pub mod source_fields {
    pub const BLOCK_NAME: &str = "Block_name";
    pub const WUA: &str = "WUA";
    pub const CV_UNIF: &str = "cv_unif";
    pub const UNIF_CLS: &str = "unif_cls";
}

/// Attribute fields every monthly layer must declare
pub const REQUIRED_FIELDS: &[&str] = &[
    source_fields::BLOCK_NAME,
    source_fields::WUA,
    source_fields::CV_UNIF,
    source_fields::UNIF_CLS,
];

// =============================================================================
// Output Schema
// =============================================================================

/// Output column names
pub mod columns {
    pub const WUA: &str = "WUA";
    pub const LATERAL: &str = "Lateral";
    pub const BANK: &str = "Bank";
    pub const YEAR: &str = "Year";
    pub const PARAMETER: &str = "Parameter";
    pub const SEASON: &str = "Season";
    pub const MONTH_NAME: &str = "Month_name";
    pub const MONTH: &str = "Month";
    pub const VALUE: &str = "Value";
    pub const CLASSIFICATION: &str = "Classification";
    pub const GEOMETRY: &str = "geometry";
}

/// Output columns in schema order (geometry last)
pub const OUTPUT_COLUMNS: &[&str] = &[
    columns::WUA,
    columns::LATERAL,
    columns::BANK,
    columns::YEAR,
    columns::PARAMETER,
    columns::SEASON,
    columns::MONTH_NAME,
    columns::MONTH,
    columns::VALUE,
    columns::CLASSIFICATION,
    columns::GEOMETRY,
];

/// Sort key of the merged dataset
pub const SORT_COLUMNS: &[&str] = &[columns::YEAR, columns::MONTH, columns::WUA];

/// Constant written to the Parameter column
pub const PARAMETER_EQUITY: &str = "Equity";

/// Bank code identifying the left bank canal
pub const LEFT_BANK_CODE: &str = "LBC";

// =============================================================================
// Output GeoPackage
// =============================================================================

/// Default output layer name
pub const DEFAULT_LAYER_NAME: &str = "equity_monthly_master";

/// Default output file name, placed beside the input directory
pub const DEFAULT_OUTPUT_FILE: &str = "equity_monthly_master.gpkg";

/// Output file extension
pub const OUTPUT_EXTENSION: &str = "gpkg";

/// GeoPackage identifiers
pub mod gpkg {
    /// `application_id` pragma value ("GPKG" in ASCII)
    pub const APPLICATION_ID: i32 = 0x4750_4B47;

    /// `user_version` pragma value for GeoPackage 1.3.0
    pub const USER_VERSION: i32 = 10300;

    /// Name of the geometry column in the feature table
    pub const GEOMETRY_COLUMN: &str = "geom";

    /// srs_id used for layers without a coordinate reference system
    pub const UNDEFINED_CARTESIAN_SRS_ID: i32 = -1;

    /// srs_id used for layers whose CRS has no EPSG authority code
    pub const CUSTOM_SRS_ID: i32 = 100_000;

    /// Layer geometry type when features disagree or none exist
    pub const GENERIC_GEOMETRY_TYPE: &str = "GEOMETRY";
}
