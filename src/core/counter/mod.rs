//! # Counter Module
//!
//! Counting the people in an image. The pipeline only depends on the
//! [`PersonCounter`] trait; how the count is produced lives here.
//!
//! ## Implementations
//! - [`DetectionCounter`] - decodes the image, runs a [`Detector`] and keeps
//!   confident `person` detections
//! - [`CommandDetector`] - a [`Detector`] backed by an external program
//! - [`ManifestCounter`] - reads counts recorded by an earlier detection pass
//!
//! A counter is built once by the caller and passed by reference into the
//! pipeline, so a loaded model is reused for every image of a run.

mod command;
mod detection;
mod manifest;

pub use command::CommandDetector;
pub use detection::{count_people, Detection, DetectionConfig, DetectionCounter, Detector};
pub use manifest::ManifestCounter;

use crate::error::CountError;
use std::path::Path;

/// Anything that can say how many people are in an image.
///
/// Implementations must be deterministic for identical input and fixed
/// configuration, and must report failures as errors rather than a zero.
pub trait PersonCounter {
    /// Count the people in the image at `path`
    fn count(&self, path: &Path) -> Result<usize, CountError>;
}

impl<C: PersonCounter + ?Sized> PersonCounter for &C {
    fn count(&self, path: &Path) -> Result<usize, CountError> {
        (**self).count(path)
    }
}

impl<C: PersonCounter + ?Sized> PersonCounter for Box<C> {
    fn count(&self, path: &Path) -> Result<usize, CountError> {
        (**self).count(path)
    }
}
