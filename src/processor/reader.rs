//! Shapefile loading
//!
//! Reads the attribute table layout, every shape with its attribute record,
//! and the `.prj` sidecar of a monthly input layer.

use crate::crs::SpatialReference;
use crate::error::Result;
use crate::geometry::shape_to_geometry;

use geo::Geometry;
use shapefile::dbase::{self, Record};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One source feature: geometry plus raw attributes
#[derive(Debug, Clone)]
pub struct SourceFeature {
    pub geometry: Option<Geometry>,
    pub attributes: Record,
}

/// A fully loaded input layer
#[derive(Debug, Clone)]
pub struct SourceLayer {
    pub path: PathBuf,
    pub crs: Option<SpatialReference>,
    /// Field names declared by the `.dbf` header
    pub fields: Vec<String>,
    pub features: Vec<SourceFeature>,
}

/// Load a shapefile with its attribute table and CRS
pub fn read_layer(path: &Path) -> Result<SourceLayer> {
    let fields = dbase::Reader::from_path(path.with_extension("dbf"))?
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect::<Vec<_>>();

    let mut reader = shapefile::Reader::from_path(path)?;
    let mut features = Vec::new();
    for entry in reader.iter_shapes_and_records() {
        let (shape, attributes) = entry?;
        features.push(SourceFeature {
            geometry: shape_to_geometry(shape, path)?,
            attributes,
        });
    }

    let crs = SpatialReference::from_sidecar(path)?;

    debug!(
        "Read {} features with fields {:?} from {} (crs: {})",
        features.len(),
        fields,
        path.display(),
        crs.as_ref().map(|c| c.name()).unwrap_or_else(|| "none".to_string())
    );

    Ok(SourceLayer {
        path: path.to_path_buf(),
        crs,
        fields,
        features,
    })
}
