//! Equity Merge Library
//!
//! Merges monthly irrigation equity shapefiles into a single GeoPackage
//! layer.
//!
//! This library provides tools for:
//! - Discovering `equity_monthly_{season}_{MM}_{YYYY}.shp` inputs
//! - Parsing the reporting period from each filename (fail-fast on mismatch)
//! - Deriving lateral, bank and WUA identifiers from block and WUA codes
//! - Concatenating all months and ordering rows by year, month and WUA
//! - Writing the result as one GeoPackage feature layer

pub mod cli;
pub mod config;
pub mod constants;
pub mod crs;
pub mod error;
pub mod fields;
pub mod filename;
pub mod geometry;
pub mod models;
pub mod processor;

// Re-export commonly used types
pub use config::MergeConfig;
pub use error::{EquityError, Result};
pub use models::{Bank, FilenameToken, ProcessingStats, Season};
pub use processor::MergeProcessor;
