//! Coordinate reference systems read from `.prj` sidecar files.

use crate::error::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static EPSG_AUTHORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("EPSG pattern is valid")
});

static CRS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*[A-Z_]+\[\s*"([^"]*)""#).expect("CRS name pattern is valid")
});

/// A coordinate reference system described by WKT
#[derive(Debug, Clone)]
pub struct SpatialReference {
    wkt: String,
}

impl SpatialReference {
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: wkt.into().trim().to_string(),
        }
    }

    /// Read the `.prj` sidecar next to a shapefile, if there is one
    pub fn from_sidecar(shp_path: &Path) -> Result<Option<Self>> {
        let prj_path = shp_path.with_extension("prj");
        if !prj_path.exists() {
            debug!("No .prj sidecar for {}", shp_path.display());
            return Ok(None);
        }

        let wkt = fs::read_to_string(&prj_path)?;
        if wkt.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(Self::from_wkt(wkt)))
    }

    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    /// EPSG code of the outermost `AUTHORITY` node
    ///
    /// WKT1 lists the authority of a node after its children, so the last
    /// match belongs to the top-level CRS.
    pub fn epsg_code(&self) -> Option<i32> {
        EPSG_AUTHORITY
            .captures_iter(&self.wkt)
            .last()
            .and_then(|caps| caps[1].parse().ok())
    }

    /// Name of the top-level CRS node, e.g. `WGS_1984_UTM_Zone_30N`
    pub fn name(&self) -> String {
        CRS_NAME
            .captures(&self.wkt)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Compare two definitions ignoring whitespace
    pub fn is_equivalent(&self, other: &SpatialReference) -> bool {
        let strip = |s: &str| s.split_whitespace().collect::<String>();
        strip(&self.wkt) == strip(&other.wkt)
    }
}
