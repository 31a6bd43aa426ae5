//! # Config Module
//!
//! Settings shared by the command-line front end: an optional JSON file,
//! overridden by flags, falling back to the built-in folder layout.
//!
//! ```json
//! {
//!   "input_dir": "/photos/inbox",
//!   "detector_command": "python3 ssd_detect.py",
//!   "detection": { "confidence_threshold": 0.3 }
//! }
//! ```

use crate::core::counter::DetectionConfig;
use crate::error::{Result, SorterError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default input folder when none is given
pub const DEFAULT_INPUT_DIR: &str = "images";
/// Default output folder name, next to the input folder
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// Default backup folder name, next to the input folder
pub const DEFAULT_BACKUP_DIR: &str = "images_backup";

/// Contents of the config file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    /// External detector program, with arguments
    pub detector_command: Option<String>,
    /// Arguments for `detector_command`; when set, the command is used
    /// verbatim as the program path
    pub detector_args: Vec<String>,
    /// JSON file of precomputed counts, used instead of a detector
    pub manifest: Option<PathBuf>,
    pub detection: DetectionConfig,
}

impl SorterConfig {
    /// `<config dir>/people-sorter/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("people-sorter").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            SorterError::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| SorterError::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Load `explicit` if given (it must exist), else the default file if present
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// The three folders of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSet {
    pub input: PathBuf,
    pub output: PathBuf,
    pub backup: PathBuf,
}

impl FolderSet {
    /// Fill in missing folders.
    ///
    /// Without any input, the layout is `./images`, `./output` and
    /// `./images_backup`. With an input, output and backup default to
    /// `{input}/../output` and `{input}/../images_backup`, which stays beside
    /// the input even for `.` or `..`.
    pub fn resolve(input: Option<PathBuf>, output: Option<PathBuf>, backup: Option<PathBuf>) -> Self {
        let (input, base) = match input {
            Some(input) => {
                let base = input.join("..");
                (input, base)
            }
            None => (Path::new(".").join(DEFAULT_INPUT_DIR), PathBuf::from(".")),
        };
        let output = output.unwrap_or_else(|| base.join(DEFAULT_OUTPUT_DIR));
        let backup = backup.unwrap_or_else(|| base.join(DEFAULT_BACKUP_DIR));
        Self {
            input,
            output,
            backup,
        }
    }
}
