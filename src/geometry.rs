//! Feature geometries.
//!
//! Shapes are converted to `geo` geometries when a layer is read, carried
//! through the master table as ISO WKB, and written as GeoPackage binary
//! with the layer srs_id and an XY envelope. Output geometries are 2D.

use crate::error::{EquityError, Result};
use geo::{BoundingRect, Geometry, Rect, coord};
use geozero::wkb::{Wkb, WkbDialect};
use geozero::{CoordDimensions, ToGeo, ToWkb};
use shapefile::Shape;
use std::path::Path;

/// Simple feature geometry types produced from shapefiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryKind {
    pub fn of(geometry: &Geometry) -> Option<Self> {
        match geometry {
            Geometry::Point(_) => Some(GeometryKind::Point),
            Geometry::LineString(_) => Some(GeometryKind::LineString),
            Geometry::Polygon(_) => Some(GeometryKind::Polygon),
            Geometry::MultiPoint(_) => Some(GeometryKind::MultiPoint),
            Geometry::MultiLineString(_) => Some(GeometryKind::MultiLineString),
            Geometry::MultiPolygon(_) => Some(GeometryKind::MultiPolygon),
            _ => None,
        }
    }

    /// Name used in `gpkg_geometry_columns.geometry_type_name`
    pub fn gpkg_name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
        }
    }
}

/// Convert a shapefile shape into a planar geometry
///
/// Null shapes have no geometry. Multipatch shapes have no simple feature
/// equivalent and are rejected. Polylines with one part become line strings
/// and polygons with one outer ring become polygons.
pub fn shape_to_geometry(shape: Shape, source: &Path) -> Result<Option<Geometry>> {
    match shape {
        Shape::NullShape => Ok(None),
        Shape::Multipatch(_) => Err(EquityError::UnsupportedGeometry {
            path: source.to_path_buf(),
            shape_type: "Multipatch".to_string(),
        }),
        shape => {
            let shape_type = format!("{:?}", shape.shapetype());
            let geometry = Geometry::<f64>::try_from(shape).map_err(|_| {
                EquityError::UnsupportedGeometry {
                    path: source.to_path_buf(),
                    shape_type,
                }
            })?;
            Ok(Some(collapse_single_part(geometry)))
        }
    }
}

fn collapse_single_part(geometry: Geometry) -> Geometry {
    match geometry {
        Geometry::MultiLineString(mut lines) if lines.0.len() == 1 => {
            Geometry::LineString(lines.0.remove(0))
        }
        Geometry::MultiPolygon(mut polygons) if polygons.0.len() == 1 => {
            Geometry::Polygon(polygons.0.remove(0))
        }
        other => other,
    }
}

/// Encode a geometry as 2D ISO WKB
pub fn encode_wkb(geometry: &Geometry) -> Result<Vec<u8>> {
    Ok(geometry.to_wkb(CoordDimensions::xy())?)
}

/// Decode ISO WKB
pub fn decode_wkb(bytes: &[u8]) -> Result<Geometry> {
    Ok(Wkb(bytes.to_vec()).to_geo()?)
}

/// Encode a geometry as a GeoPackage blob with an XY envelope
pub fn encode_gpkg(geometry: &Geometry, srs_id: i32) -> Result<Vec<u8>> {
    // GeoPackage envelope order is minx, maxx, miny, maxy
    let envelope = geometry
        .bounding_rect()
        .map(|rect| vec![rect.min().x, rect.max().x, rect.min().y, rect.max().y])
        .unwrap_or_default();

    Ok(geometry.to_wkb_dialect(
        WkbDialect::Geopackage,
        CoordDimensions::xy(),
        Some(srs_id),
        envelope,
    )?)
}

/// Smallest rectangle covering both inputs
pub fn union_rect(a: Rect, b: Rect) -> Rect {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}
