//! Loading grid sets from a directory of YAML files.
//!
//! Each `*.yaml` / `*.yml` file holds a `gridsets` list:
//!
//! ```yaml
//! gridsets:
//!   - name: SwissGrid
//!     srs: EPSG:2056
//!     extent: [2420000, 1030000, 2900000, 1350000]
//!     resolutions: [4000, 2000, 1000, 500]
//! ```

use crate::gridset::GridSetConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tcrs_common::{TcrsError, TcrsResult};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct GridSetFile {
    #[serde(default)]
    gridsets: Vec<GridSetConfig>,
}

/// Parse a single grid set file.
pub fn load_gridset_file(path: &Path) -> TcrsResult<Vec<GridSetConfig>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| TcrsError::Config(format!("Cannot read {:?}: {}", path, e)))?;

    let file: GridSetFile = serde_yaml::from_str(&contents)
        .map_err(|e| TcrsError::Config(format!("Invalid YAML in {:?}: {}", path, e)))?;

    Ok(file.gridsets)
}

/// Load every grid set found in `dir`, in file name order.
///
/// A missing directory yields no grid sets. Files that cannot be read or
/// parsed are skipped with a warning.
pub fn load_gridsets(dir: &Path) -> Vec<GridSetConfig> {
    if !dir.exists() {
        warn!(path = ?dir, "Grid set config directory not found, using built-in pyramids only");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|s| s.to_str()),
                    Some("yaml") | Some("yml")
                )
            })
            .collect(),
        Err(e) => {
            warn!(path = ?dir, error = %e, "Cannot list grid set config directory");
            return Vec::new();
        }
    };
    files.sort();

    let mut gridsets = Vec::new();
    for path in files {
        match load_gridset_file(&path) {
            Ok(found) => {
                debug!(path = ?path, count = found.len(), "Loaded grid sets");
                gridsets.extend(found);
            }
            Err(e) => warn!(path = ?path, error = %e, "Failed to load grid set config"),
        }
    }
    gridsets
}
