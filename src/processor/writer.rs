//! GeoPackage writing module
//!
//! Persists the merged master table as a single feature layer in an OGC
//! GeoPackage (SQLite) file: core metadata tables, the layer CRS, and one
//! feature table populated inside a single transaction.

use super::merge::MergedLayer;
use crate::constants::{columns, gpkg};
use crate::crs::SpatialReference;
use crate::error::Result;
use crate::geometry::{GeometryKind, decode_wkb, encode_gpkg, union_rect};

use chrono::Utc;
use geo::{BoundingRect, Geometry, Rect};
use rusqlite::{Connection, Transaction, params};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CREATE_CORE_TABLES: &str = "
CREATE TABLE gpkg_spatial_ref_sys (
    srs_name TEXT NOT NULL,
    srs_id INTEGER PRIMARY KEY,
    organization TEXT NOT NULL,
    organization_coordsys_id INTEGER NOT NULL,
    definition TEXT NOT NULL,
    description TEXT
);
CREATE TABLE gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    min_x DOUBLE,
    min_y DOUBLE,
    max_x DOUBLE,
    max_y DOUBLE,
    srs_id INTEGER,
    CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
CREATE TABLE gpkg_geometry_columns (
    table_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    geometry_type_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL,
    z TINYINT NOT NULL,
    m TINYINT NOT NULL,
    CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
    CONSTRAINT uk_gc_table_name UNIQUE (table_name),
    CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
    CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys (srs_id)
);
";

const WGS84_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AXIS["Latitude",NORTH],AXIS["Longitude",EAST],AUTHORITY["EPSG","4326"]]"#;

/// Writer for the merged GeoPackage layer
#[derive(Debug)]
pub struct GeoPackageWriter {
    output_path: PathBuf,
    layer_name: String,
}

impl GeoPackageWriter {
    pub fn new(output_path: PathBuf, layer_name: impl Into<String>) -> Self {
        Self {
            output_path,
            layer_name: layer_name.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the merged layer, replacing any existing file
    ///
    /// Returns the number of features written.
    pub fn write(&self, layer: &MergedLayer) -> Result<usize> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if self.output_path.exists() {
            debug!("Replacing existing {}", self.output_path.display());
            fs::remove_file(&self.output_path)?;
        }

        let mut conn = Connection::open(&self.output_path)?;
        conn.pragma_update(None, "application_id", gpkg::APPLICATION_ID)?;
        conn.pragma_update(None, "user_version", gpkg::USER_VERSION)?;

        let tx = conn.transaction()?;
        tx.execute_batch(CREATE_CORE_TABLES)?;
        insert_default_srs(&tx)?;
        let srs_id = register_srs(&tx, layer.crs.as_ref())?;

        tx.execute_batch(&self.feature_table_ddl())?;
        let summary = self.insert_features(&tx, layer, srs_id)?;

        let extent = summary.extent;
        tx.execute(
            "INSERT INTO gpkg_contents
                (table_name, data_type, identifier, description, last_change,
                 min_x, min_y, max_x, max_y, srs_id)
             VALUES (?1, 'features', ?1, '', ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.layer_name,
                Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
                extent.map(|e| e.min().x),
                extent.map(|e| e.min().y),
                extent.map(|e| e.max().x),
                extent.map(|e| e.max().y),
                srs_id,
            ],
        )?;
        tx.execute(
            "INSERT INTO gpkg_geometry_columns
                (table_name, column_name, geometry_type_name, srs_id, z, m)
             VALUES (?1, ?2, ?3, ?4, 0, 0)",
            params![
                self.layer_name,
                gpkg::GEOMETRY_COLUMN,
                summary.geometry_type_name(),
                srs_id,
            ],
        )?;
        tx.commit()?;

        info!(
            "Wrote {} features to layer '{}' in {}",
            summary.rows,
            self.layer_name,
            self.output_path.display()
        );

        Ok(summary.rows)
    }

    fn feature_table_ddl(&self) -> String {
        format!(
            "CREATE TABLE \"{layer}\" (
                fid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                \"{geom}\" BLOB,
                \"{wua}\" TEXT,
                \"{lateral}\" TEXT,
                \"{bank}\" TEXT,
                \"{year}\" INTEGER,
                \"{parameter}\" TEXT,
                \"{season}\" TEXT,
                \"{month_name}\" TEXT,
                \"{month}\" INTEGER,
                \"{value}\" REAL,
                \"{classification}\" TEXT
            );",
            layer = self.layer_name,
            geom = gpkg::GEOMETRY_COLUMN,
            wua = columns::WUA,
            lateral = columns::LATERAL,
            bank = columns::BANK,
            year = columns::YEAR,
            parameter = columns::PARAMETER,
            season = columns::SEASON,
            month_name = columns::MONTH_NAME,
            month = columns::MONTH,
            value = columns::VALUE,
            classification = columns::CLASSIFICATION,
        )
    }

    fn insert_features(
        &self,
        tx: &Transaction<'_>,
        layer: &MergedLayer,
        srs_id: i32,
    ) -> Result<FeatureSummary> {
        let frame = &layer.frame;
        let wua = frame.column(columns::WUA)?.str()?;
        let lateral = frame.column(columns::LATERAL)?.str()?;
        let bank = frame.column(columns::BANK)?.str()?;
        let year = frame.column(columns::YEAR)?.i32()?;
        let parameter = frame.column(columns::PARAMETER)?.str()?;
        let season = frame.column(columns::SEASON)?.str()?;
        let month_name = frame.column(columns::MONTH_NAME)?.str()?;
        let month = frame.column(columns::MONTH)?.i32()?;
        let value = frame.column(columns::VALUE)?.f64()?;
        let classification = frame.column(columns::CLASSIFICATION)?.str()?;
        let geometry = frame.column(columns::GEOMETRY)?.binary()?;

        let mut summary = FeatureSummary::default();
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO \"{}\" (\"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\")
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            self.layer_name,
            gpkg::GEOMETRY_COLUMN,
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
        ))?;

        for i in 0..frame.height() {
            let blob = match geometry.get(i) {
                Some(wkb) => {
                    let feature_geometry = decode_wkb(wkb)?;
                    summary.observe(&feature_geometry);
                    Some(encode_gpkg(&feature_geometry, srs_id)?)
                }
                None => None,
            };

            stmt.execute(params![
                blob,
                wua.get(i),
                lateral.get(i),
                bank.get(i),
                year.get(i),
                parameter.get(i),
                season.get(i),
                month_name.get(i),
                month.get(i),
                value.get(i),
                classification.get(i),
            ])?;
            summary.rows += 1;
        }

        Ok(summary)
    }
}

/// Extent and geometry types seen while inserting features
#[derive(Debug, Default)]
struct FeatureSummary {
    rows: usize,
    extent: Option<Rect>,
    kinds: HashSet<GeometryKind>,
}

impl FeatureSummary {
    fn observe(&mut self, geometry: &Geometry) {
        if let Some(rect) = geometry.bounding_rect() {
            self.extent = Some(match self.extent {
                Some(extent) => union_rect(extent, rect),
                None => rect,
            });
        }
        if let Some(kind) = GeometryKind::of(geometry) {
            self.kinds.insert(kind);
        }
    }

    fn geometry_type_name(&self) -> &'static str {
        match self.kinds.iter().next() {
            Some(kind) if self.kinds.len() == 1 => kind.gpkg_name(),
            _ => gpkg::GENERIC_GEOMETRY_TYPE,
        }
    }
}

/// Insert the three spatial reference systems every GeoPackage defines
fn insert_default_srs(tx: &Transaction<'_>) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO gpkg_spatial_ref_sys
            (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    stmt.execute(params![
        "Undefined cartesian SRS",
        -1,
        "NONE",
        -1,
        "undefined",
        "undefined cartesian coordinate reference system",
    ])?;
    stmt.execute(params![
        "Undefined geographic SRS",
        0,
        "NONE",
        0,
        "undefined",
        "undefined geographic coordinate reference system",
    ])?;
    stmt.execute(params![
        "WGS 84 geodetic",
        4326,
        "EPSG",
        4326,
        WGS84_WKT,
        "longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid",
    ])?;
    Ok(())
}

/// Register the layer CRS and return its srs_id
///
/// EPSG-coded definitions use their code as srs_id; other definitions are
/// stored under a custom id.
fn register_srs(tx: &Transaction<'_>, crs: Option<&SpatialReference>) -> Result<i32> {
    let Some(crs) = crs else {
        return Ok(gpkg::UNDEFINED_CARTESIAN_SRS_ID);
    };

    let (srs_id, organization, coordsys_id) = match crs.epsg_code() {
        Some(code) => (code, "EPSG", code),
        None => (gpkg::CUSTOM_SRS_ID, "NONE", gpkg::CUSTOM_SRS_ID),
    };

    tx.execute(
        "INSERT OR IGNORE INTO gpkg_spatial_ref_sys
            (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
        params![crs.name(), srs_id, organization, coordsys_id, crs.wkt()],
    )?;

    debug!("Registered CRS '{}' as srs_id {}", crs.name(), srs_id);
    Ok(srs_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{
        BinaryChunked, Column, DataFrame, IntoSeries, NamedFrom, NewChunkedArray,
    };
    use tempfile::TempDir;

    fn sample_layer(crs: Option<SpatialReference>) -> MergedLayer {
        let point = crate::geometry::encode_wkb(&Geometry::Point(geo::Point::new(10.0, 20.0)))
            .unwrap();

        let frame = DataFrame::new(vec![
            Column::new("WUA".into(), vec![Some("WUA1"), Some("WUA2")]),
            Column::new("Lateral".into(), vec![Some("L3A"), None]),
            Column::new("Bank".into(), vec![Some("Left"), None]),
            Column::new("Year".into(), vec![2014, 2014]),
            Column::new("Parameter".into(), vec!["Equity", "Equity"]),
            Column::new("Season".into(), vec!["Dry", "Dry"]),
            Column::new("Month_name".into(), vec!["Jan", "Jan"]),
            Column::new("Month".into(), vec![1, 1]),
            Column::new("Value".into(), vec![Some(0.25), None]),
            Column::new("Classification".into(), vec![Some("Good"), None]),
            Column::from(
                BinaryChunked::from_iter_options(
                    "geometry".into(),
                    vec![Some(point.as_slice()), None].into_iter(),
                )
                .into_series(),
            ),
        ])
        .unwrap();

        MergedLayer { frame, crs }
    }

    #[test]
    fn test_write_creates_geopackage() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("nested").join("out.gpkg");
        let writer = GeoPackageWriter::new(output.clone(), "equity_monthly_master");

        let written = writer.write(&sample_layer(None)).unwrap();
        assert_eq!(written, 2);
        assert!(output.exists());

        let conn = Connection::open(&output).unwrap();
        let app_id: i32 = conn
            .query_row("PRAGMA application_id", [], |r| r.get(0))
            .unwrap();
        let user_version: i32 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(app_id, gpkg::APPLICATION_ID);
        assert_eq!(user_version, gpkg::USER_VERSION);

        let (data_type, min_x, max_y, srs_id): (String, f64, f64, i32) = conn
            .query_row(
                "SELECT data_type, min_x, max_y, srs_id FROM gpkg_contents WHERE table_name = ?1",
                ["equity_monthly_master"],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(data_type, "features");
        assert_eq!((min_x, max_y), (10.0, 20.0));
        assert_eq!(srs_id, gpkg::UNDEFINED_CARTESIAN_SRS_ID);

        let geometry_type: String = conn
            .query_row(
                "SELECT geometry_type_name FROM gpkg_geometry_columns WHERE table_name = ?1",
                ["equity_monthly_master"],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(geometry_type, "POINT");

        let rows: Vec<(Option<String>, Option<String>, Option<f64>, bool)> = {
            let mut stmt = conn
                .prepare(
                    "SELECT Lateral, Bank, Value, geom IS NULL FROM equity_monthly_master ORDER BY fid",
                )
                .unwrap();
            stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
                .unwrap()
                .map(|r| r.unwrap())
                .collect()
        };
        assert_eq!(
            rows,
            vec![
                (Some("L3A".to_string()), Some("Left".to_string()), Some(0.25), false),
                (None, None, None, true),
            ]
        );
    }

    #[test]
    fn test_write_registers_epsg_crs() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.gpkg");
        let crs = SpatialReference::from_wkt(
            r#"PROJCS["WGS 84 / UTM zone 30N",GEOGCS["WGS 84"],AUTHORITY["EPSG","32630"]]"#,
        );

        GeoPackageWriter::new(output.clone(), "layer")
            .write(&sample_layer(Some(crs)))
            .unwrap();

        let conn = Connection::open(&output).unwrap();
        let (name, organization): (String, String) = conn
            .query_row(
                "SELECT srs_name, organization FROM gpkg_spatial_ref_sys WHERE srs_id = 32630",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(name, "WGS 84 / UTM zone 30N");
        assert_eq!(organization, "EPSG");

        let blob: Vec<u8> = conn
            .query_row(
                "SELECT geom FROM layer WHERE geom IS NOT NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(i32::from_le_bytes(blob[4..8].try_into().unwrap()), 32630);
        assert_eq!(
            decode_wkb(&blob[40..]).unwrap(),
            Geometry::Point(geo::Point::new(10.0, 20.0))
        );
    }

    #[test]
    fn test_mixed_geometry_types_and_extent() {
        use geo::{LineString, Point};

        let point = crate::geometry::encode_wkb(&Geometry::Point(Point::new(-3.0, 8.0))).unwrap();
        let line = crate::geometry::encode_wkb(&Geometry::LineString(LineString::from(vec![
            (1.0, 1.0),
            (4.0, -2.0),
        ])))
        .unwrap();

        let mut layer = sample_layer(None);
        layer
            .frame
            .with_column(
                BinaryChunked::from_iter_options(
                    "geometry".into(),
                    vec![Some(point.as_slice()), Some(line.as_slice())].into_iter(),
                )
                .into_series(),
            )
            .unwrap();

        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.gpkg");
        GeoPackageWriter::new(output.clone(), "layer")
            .write(&layer)
            .unwrap();

        let conn = Connection::open(&output).unwrap();
        let geometry_type: String = conn
            .query_row("SELECT geometry_type_name FROM gpkg_geometry_columns", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(geometry_type, "GEOMETRY");

        let extent: (f64, f64, f64, f64) = conn
            .query_row(
                "SELECT min_x, min_y, max_x, max_y FROM gpkg_contents",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(extent, (-3.0, -2.0, 4.0, 8.0));
    }

    #[test]
    fn test_write_registers_custom_crs() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.gpkg");
        let crs = SpatialReference::from_wkt(r#"PROJCS["Local_Grid",GEOGCS["GCS_WGS_1984"]]"#);

        GeoPackageWriter::new(output.clone(), "layer")
            .write(&sample_layer(Some(crs)))
            .unwrap();

        let conn = Connection::open(&output).unwrap();
        let srs_id: i32 = conn
            .query_row("SELECT srs_id FROM gpkg_geometry_columns", [], |r| r.get(0))
            .unwrap();
        assert_eq!(srs_id, gpkg::CUSTOM_SRS_ID);
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.gpkg");
        fs::write(&output, "not a geopackage").unwrap();

        let writer = GeoPackageWriter::new(output.clone(), "layer");
        writer.write(&sample_layer(None)).unwrap();
        writer.write(&sample_layer(None)).unwrap();

        let conn = Connection::open(&output).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM layer", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
