//! Accumulation, concatenation and ordering of per-file frames.

use crate::constants::SORT_COLUMNS;
use crate::crs::SpatialReference;
use crate::error::{EquityError, Result};

use polars::prelude::{DataFrame, IntoLazy, LazyFrame, SortMultipleOptions, UnionArgs, col, concat};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The merged master table and its coordinate reference system
#[derive(Debug)]
pub struct MergedLayer {
    pub frame: DataFrame,
    pub crs: Option<SpatialReference>,
}

impl MergedLayer {
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Collects transformed frames in enumeration order
///
/// The CRS of the first pushed frame becomes the CRS of the merged layer.
/// A later frame whose CRS is known and differs from it is rejected.
pub struct LayerAccumulator {
    input_dir: PathBuf,
    frames: Vec<LazyFrame>,
    crs: Option<SpatialReference>,
    input_rows: usize,
}

impl LayerAccumulator {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            frames: Vec::new(),
            crs: None,
            input_rows: 0,
        }
    }

    /// Number of frames collected so far
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total rows across collected frames
    pub fn input_rows(&self) -> usize {
        self.input_rows
    }

    /// Append one transformed frame
    pub fn push(
        &mut self,
        source: &Path,
        frame: DataFrame,
        crs: Option<SpatialReference>,
    ) -> Result<()> {
        if self.frames.is_empty() {
            self.crs = crs;
        } else {
            match (&self.crs, &crs) {
                (Some(first), Some(other)) if !first.is_equivalent(other) => {
                    return Err(EquityError::CrsMismatch {
                        path: source.to_path_buf(),
                        first: first.name(),
                    });
                }
                (Some(first), None) => {
                    warn!(
                        "{} has no .prj, assuming {}",
                        source.display(),
                        first.name()
                    );
                }
                (None, Some(other)) => {
                    warn!(
                        "{} declares {} but the merged layer has no CRS",
                        source.display(),
                        other.name()
                    );
                }
                _ => {}
            }
        }

        self.input_rows += frame.height();
        self.frames.push(frame.lazy());
        Ok(())
    }

    /// Concatenate all frames and sort by year, month and WUA
    ///
    /// The sort is stable, so rows with equal keys keep their input order.
    pub fn finish(self) -> Result<MergedLayer> {
        if self.is_empty() {
            return Err(EquityError::NoInputFiles {
                path: self.input_dir,
            });
        }

        debug!(
            "Concatenating {} frames ({} rows)",
            self.frames.len(),
            self.input_rows
        );

        let sort_keys: Vec<_> = SORT_COLUMNS.iter().map(|name| col(*name)).collect();
        let frame = concat(self.frames, UnionArgs::default())?
            .sort_by_exprs(
                sort_keys,
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;

        Ok(MergedLayer {
            frame,
            crs: self.crs,
        })
    }
}
