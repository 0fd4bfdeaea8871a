//! File discovery module for monthly equity layers
//!
//! Lists the shapefiles sitting directly inside the input directory, in the
//! order the platform enumerates them.

use crate::constants::INPUT_EXTENSION;
use crate::error::{EquityError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File discovery component for the input directory
#[derive(Debug)]
pub struct FileDiscovery {
    input_dir: PathBuf,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(input_dir: PathBuf) -> Self {
        Self { input_dir }
    }

    /// Discover all shapefiles in the input directory
    ///
    /// Only the top level is scanned:
    /// ```text
    /// input_dir/
    ///   equity_monthly_dry_01_2014.shp   <- found
    ///   equity_monthly_dry_01_2014.dbf
    ///   archive/
    ///     equity_monthly_dry_01_2013.shp <- ignored
    /// ```
    pub fn discover_shapefiles(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(EquityError::InputDirNotFound {
                path: self.input_dir.clone(),
            });
        }

        debug!("Searching for shapefiles in: {}", self.input_dir.display());

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.input_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_shapefile(path) {
                files.push(path.to_path_buf());
            }
        }

        debug!("Found {} shapefiles", files.len());
        Ok(files)
    }
}

/// Check if a path has the `.shp` extension
fn is_shapefile(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == INPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_shapefiles() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path();

        for name in [
            "equity_monthly_dry_01_2014.shp",
            "equity_monthly_dry_01_2014.dbf",
            "equity_monthly_dry_01_2014.shx",
            "equity_monthly_wet_07_2015.shp",
            "notes.txt",
        ] {
            fs::write(input.join(name), "x").unwrap();
        }

        let discovery = FileDiscovery::new(input.to_path_buf());
        let mut names: Vec<String> = discovery
            .discover_shapefiles()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "equity_monthly_dry_01_2014.shp".to_string(),
                "equity_monthly_wet_07_2015.shp".to_string(),
            ]
        );
    }

    #[test]
    fn test_subdirectories_are_not_scanned() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("archive");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("equity_monthly_dry_01_2013.shp"), "x").unwrap();
        fs::create_dir_all(temp_dir.path().join("folder.shp")).unwrap();

        let discovery = FileDiscovery::new(temp_dir.path().to_path_buf());
        assert!(discovery.discover_shapefiles().unwrap().is_empty());
    }

    #[test]
    fn test_missing_input_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = FileDiscovery::new(missing.clone()).discover_shapefiles();
        match result {
            Err(EquityError::InputDirNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected InputDirNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_is_shapefile() {
        assert!(is_shapefile(Path::new("a.shp")));
        assert!(is_shapefile(Path::new("/data/equity_monthly_dry_01_2014.shp")));
        assert!(!is_shapefile(Path::new("a.dbf")));
        assert!(!is_shapefile(Path::new("a")));
        assert!(!is_shapefile(Path::new("a.SHP"))); // Case sensitive
    }
}
