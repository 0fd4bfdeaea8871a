//! Main processing engine.
//!
//! Orchestrates the merge in one forward pass: file discovery, filename
//! parsing, per-file loading and transformation, concatenation with a
//! stable sort, and the final GeoPackage write.

pub mod discovery;
pub mod merge;
pub mod reader;
pub mod transform;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{
    discovery::FileDiscovery, merge::LayerAccumulator, reader::read_layer,
    transform::transform_layer, writer::GeoPackageWriter,
};

use crate::config::MergeConfig;
use crate::error::{EquityError, Result};
use crate::filename::parse_filename;
use crate::models::{FilenameToken, ProcessingStats};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Main processor for merging monthly equity layers
#[derive(Debug)]
pub struct MergeProcessor {
    config: MergeConfig,
    file_discovery: FileDiscovery,
    writer: GeoPackageWriter,
}

impl MergeProcessor {
    /// Create a new processor from a validated configuration
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;

        if !config.input_dir.is_dir() {
            return Err(EquityError::InputDirNotFound {
                path: config.input_dir.clone(),
            });
        }

        Ok(Self {
            file_discovery: FileDiscovery::new(config.input_dir.clone()),
            writer: GeoPackageWriter::new(config.output_path.clone(), config.layer_name.clone()),
            config,
        })
    }

    /// Discover input files and parse every filename
    ///
    /// A single non-matching name aborts the run before any data is read.
    pub fn plan(&self) -> Result<Vec<(PathBuf, FilenameToken)>> {
        let files = self.file_discovery.discover_shapefiles()?;
        if files.is_empty() {
            return Err(EquityError::NoInputFiles {
                path: self.config.input_dir.clone(),
            });
        }

        files
            .into_iter()
            .map(|path| {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let token = parse_filename(&filename)?;
                Ok((path, token))
            })
            .collect()
    }

    /// Main processing entry point
    pub fn process(&mut self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        info!("Merging equity layers from {}", self.config.input_dir.display());

        let plan = self.plan()?;
        info!("Found {} monthly layers", plan.len());

        if self.config.dry_run {
            self.report_plan(&plan);
            return Ok(ProcessingStats {
                files_processed: 0,
                total_records: 0,
                output_path: self.config.output_path.clone(),
                processing_time_ms: start_time.elapsed().as_millis(),
            });
        }

        let progress = self.progress_bar(plan.len());
        let mut accumulator = LayerAccumulator::new(self.config.input_dir.clone());

        for (path, token) in &plan {
            progress.set_message(token.to_string());

            let layer = read_layer(path)?;
            let frame = transform_layer(&layer, token)?;
            debug!("{}: {} records", path.display(), frame.height());
            accumulator.push(path, frame, layer.crs)?;

            progress.inc(1);
        }
        progress.finish_and_clear();

        let (layers, input_rows) = (accumulator.len(), accumulator.input_rows());
        let merged = accumulator.finish()?;
        debug!(
            "Merged {} of {} input rows from {} layers",
            merged.height(),
            input_rows,
            layers
        );

        let total_records = self.writer.write(&merged)?;

        println!(
            "{}",
            "Monthly equity shapefiles successfully merged"
                .bright_green()
                .bold()
        );
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.writer.output_path().display()
        );
        println!(
            "  {} {}",
            "Total records:".bright_cyan(),
            total_records.to_string().bright_white().bold()
        );

        Ok(ProcessingStats {
            files_processed: plan.len(),
            total_records,
            output_path: self.config.output_path.clone(),
            processing_time_ms: start_time.elapsed().as_millis(),
        })
    }

    fn report_plan(&self, plan: &[(PathBuf, FilenameToken)]) {
        println!("{}", "Dry run - no data read or written".bright_yellow());
        for (path, token) in plan {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            println!(
                "  {} {} {} {}",
                name.bright_white(),
                token.season.to_string().bright_cyan(),
                token.month_name,
                token.year
            );
        }
        println!(
            "  {} {} (layer '{}')",
            "Output:".bright_cyan(),
            self.config.output_path.display(),
            self.config.layer_name
        );
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
