//! Error handling for equity merge operations.
//!
//! Provides error types with context for directory scanning, filename
//! parsing, shapefile loading, table merging and GeoPackage writing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EquityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("Attribute table error: {0}")]
    Dbase(#[from] shapefile::dbase::Error),

    #[error("Geometry encoding error: {0}")]
    Geometry(#[from] geozero::error::GeozeroError),

    #[error("Directory traversal error: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Input directory not found: {path}")]
    InputDirNotFound { path: PathBuf },

    #[error("No shapefiles found in input directory: {path}")]
    NoInputFiles { path: PathBuf },

    #[error("Filename does not match expected pattern: {filename}")]
    FilenamePattern { filename: String },

    #[error("Invalid month '{month}' in filename: {filename}")]
    InvalidMonth { filename: String, month: String },

    #[error("Missing field '{field}' in record {record} of file: {path}")]
    MissingField {
        path: PathBuf,
        field: String,
        record: usize,
    },

    #[error("Missing field '{field}' in attribute table of file: {path}")]
    MissingColumn { path: PathBuf, field: String },

    #[error("Unsupported geometry type {shape_type} in file: {path}")]
    UnsupportedGeometry { path: PathBuf, shape_type: String },

    #[error(
        "Coordinate reference system of {path} does not match the first input ({first})"
    )]
    CrsMismatch { path: PathBuf, first: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, EquityError>;
