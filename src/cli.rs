//! Command-line interface components.

use crate::config::MergeConfig;
use crate::constants::DEFAULT_LAYER_NAME;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "equity_merge")]
#[command(about = "Merge monthly equity shapefiles into a single GeoPackage layer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory containing equity_monthly_{season}_{MM}_{YYYY}.shp files
    #[arg(value_name = "INPUT_DIR", env = "EQUITY_INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output GeoPackage (defaults to <INPUT_DIR>/../equity_monthly_master.gpkg)
    #[arg(short, long, value_name = "FILE", env = "EQUITY_OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Name of the output layer
    #[arg(long, default_value = DEFAULT_LAYER_NAME, env = "EQUITY_LAYER")]
    pub layer: String,

    /// List the input files and their parsed periods, then exit
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the run configuration from the parsed arguments
    pub fn to_config(&self) -> MergeConfig {
        let mut config = MergeConfig::new(&self.input_dir).with_layer_name(&self.layer);
        if let Some(output) = &self.output {
            config = config.with_output_path(output);
        }
        if self.dry_run {
            config = config.with_dry_run();
        }
        if self.no_progress {
            config = config.without_progress();
        }
        config
    }

    /// Log level for this crate's targets
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
