//! Counts recorded ahead of time in a JSON manifest.
//!
//! ```json
//! { "a.jpg": 2, "b.png": 0 }
//! ```
//!
//! Keys are file names (not paths), so a manifest produced for one folder
//! still applies after the folder is moved.

use super::PersonCounter;
use crate::error::{CountError, SorterError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ManifestCounter {
    counts: HashMap<String, usize>,
}

impl ManifestCounter {
    pub fn from_map(counts: HashMap<String, usize>) -> Self {
        Self { counts }
    }

    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self, SorterError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            SorterError::Config(format!("cannot read manifest {}: {}", path.display(), e))
        })?;
        let counts = serde_json::from_str(&raw).map_err(|e| {
            SorterError::Config(format!("invalid manifest {}: {}", path.display(), e))
        })?;
        Ok(Self { counts })
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl PersonCounter for ManifestCounter {
    fn count(&self, path: &Path) -> Result<usize, CountError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.counts
            .get(&name)
            .copied()
            .ok_or(CountError::Missing { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn looks_up_by_file_name() {
        let counter = ManifestCounter::from_map(HashMap::from([("a.jpg".to_string(), 2)]));
        assert_eq!(counter.count(Path::new("/in/a.jpg")).unwrap(), 2);
    }

    #[test]
    fn unknown_file_is_an_error() {
        let counter = ManifestCounter::default();
        assert!(matches!(
            counter.count(Path::new("/in/b.png")),
            Err(CountError::Missing { .. })
        ));
    }

    #[test]
    fn loads_from_json_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("counts.json");
        fs::write(&path, r#"{"a.jpg": 3, "b.png": 0}"#).unwrap();

        let counter = ManifestCounter::load(&path).unwrap();
        assert_eq!(counter.len(), 2);
        assert_eq!(counter.count(Path::new("b.png")).unwrap(), 0);
    }

    #[test]
    fn malformed_manifest_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("counts.json");
        fs::write(&path, r#"{"a.jpg": -1}"#).unwrap();

        assert!(matches!(
            ManifestCounter::load(&path),
            Err(SorterError::Config(_))
        ));
    }
}
