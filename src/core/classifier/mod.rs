//! # Classifier Module
//!
//! Decides from a file name alone whether a file is an image the sorter
//! processes. Files are never opened here, so listing a folder stays cheap.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats the sorter recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Unknown,
}

impl ImageFormat {
    /// Detect format from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            _ => ImageFormat::Unknown,
        }
    }

    /// Format of the file at `path`, judged by its extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Name-based filter for processable images
#[derive(Debug, Clone, Copy, Default)]
pub struct FileClassifier;

impl FileClassifier {
    pub fn new() -> Self {
        Self
    }

    /// True iff `file_name` ends in `.png`, `.jpg` or `.jpeg`, in any case
    pub fn is_processable(&self, file_name: &str) -> bool {
        ImageFormat::from_path(Path::new(file_name)).is_supported()
    }
}
