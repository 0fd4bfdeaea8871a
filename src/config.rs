//! Configuration management and validation.
//!
//! Collects the input directory, output GeoPackage path and layer name
//! into one structure that is validated before a run starts.

use crate::constants::{DEFAULT_LAYER_NAME, DEFAULT_OUTPUT_FILE, OUTPUT_EXTENSION};
use crate::error::{EquityError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings for one merge run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Directory holding the monthly shapefiles
    pub input_dir: PathBuf,

    /// GeoPackage file to create
    pub output_path: PathBuf,

    /// Name of the layer written to the GeoPackage
    pub layer_name: String,

    /// Scan and parse filenames only, without reading or writing data
    pub dry_run: bool,

    /// Show a progress bar while reading files
    pub show_progress: bool,
}

impl MergeConfig {
    /// Create a configuration with the default output location and layer
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        let output_path = default_output_path(&input_dir);
        Self {
            input_dir,
            output_path,
            layer_name: DEFAULT_LAYER_NAME.to_string(),
            dry_run: false,
            show_progress: true,
        }
    }

    /// Set the output GeoPackage path
    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    /// Set the output layer name
    pub fn with_layer_name(mut self, layer_name: impl Into<String>) -> Self {
        self.layer_name = layer_name.into();
        self
    }

    /// Enable dry run mode
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !is_valid_layer_name(&self.layer_name) {
            return Err(EquityError::Configuration {
                message: format!(
                    "Invalid layer name '{}': use letters, digits and underscores, starting with a letter or underscore",
                    self.layer_name
                ),
            });
        }

        let has_gpkg_extension = self
            .output_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
        if !has_gpkg_extension {
            return Err(EquityError::Configuration {
                message: format!(
                    "Output path must end in .{}: {}",
                    OUTPUT_EXTENSION,
                    self.output_path.display()
                ),
            });
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}

/// Default output path: `<parent of input_dir>/equity_monthly_master.gpkg`
pub fn default_output_path(input_dir: &Path) -> PathBuf {
    input_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_OUTPUT_FILE)
}

fn is_valid_layer_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
