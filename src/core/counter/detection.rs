//! Person counting on top of an object detector.

use super::PersonCounter;
use crate::error::CountError;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One object reported by a detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Label index in the detector's class list
    pub class_id: u32,
    /// Detector confidence in `0.0..=1.0`
    pub confidence: f32,
}

/// An object detector working on already-decoded pixels
pub trait Detector {
    /// Detect objects in `image`; `path` is only used for error context
    fn detect(&self, path: &Path, image: &DynamicImage) -> Result<Vec<Detection>, CountError>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&self, path: &Path, image: &DynamicImage) -> Result<Vec<Detection>, CountError> {
        (**self).detect(path, image)
    }
}

/// How detections are turned into a person count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Class id of `person` in the detector's label set (15 for MobileNet-SSD VOC)
    pub person_class_id: u32,
    /// Detections must score strictly above this
    pub confidence_threshold: f32,
    /// Side of the square the image is resized to before detection
    pub input_size: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            person_class_id: 15,
            confidence_threshold: 0.2,
            input_size: 300,
        }
    }
}

/// Count detections of the person class above the threshold
pub fn count_people(detections: &[Detection], config: &DetectionConfig) -> usize {
    detections
        .iter()
        .filter(|d| d.class_id == config.person_class_id)
        .filter(|d| d.confidence > config.confidence_threshold)
        .count()
}

/// [`PersonCounter`] that decodes, resizes and runs a [`Detector`]
pub struct DetectionCounter<D> {
    detector: D,
    config: DetectionConfig,
}

impl<D: Detector> DetectionCounter<D> {
    pub fn new(detector: D) -> Self {
        Self::with_config(detector, DetectionConfig::default())
    }

    pub fn with_config(detector: D, config: DetectionConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }
}

impl<D: Detector> PersonCounter for DetectionCounter<D> {
    fn count(&self, path: &Path) -> Result<usize, CountError> {
        let image = image::open(path).map_err(|e| CountError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let size = self.config.input_size;
        let input = if size > 0 {
            image.resize_exact(size, size, FilterType::Triangle)
        } else {
            image
        };

        let detections = self.detector.detect(path, &input)?;
        let people = count_people(&detections, &self.config);

        debug!(
            path = %path.display(),
            detections = detections.len(),
            people,
            "counted people"
        );

        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};
    use std::cell::Cell;
    use tempfile::TempDir;

    fn detection(class_id: u32, confidence: f32) -> Detection {
        Detection {
            class_id,
            confidence,
        }
    }

    struct FixedDetector {
        detections: Vec<Detection>,
        seen_size: Cell<(u32, u32)>,
    }

    impl Detector for FixedDetector {
        fn detect(&self, _path: &Path, image: &DynamicImage) -> Result<Vec<Detection>, CountError> {
            self.seen_size.set(image.dimensions());
            Ok(self.detections.clone())
        }
    }

    #[test]
    fn only_confident_people_are_counted() {
        let detections = vec![
            detection(15, 0.9),
            detection(15, 0.21),
            detection(15, 0.2),
            detection(15, 0.05),
            detection(7, 0.99),
        ];
        assert_eq!(count_people(&detections, &DetectionConfig::default()), 2);
    }

    #[test]
    fn threshold_and_class_are_configurable() {
        let config = DetectionConfig {
            person_class_id: 1,
            confidence_threshold: 0.5,
            input_size: 300,
        };
        let detections = vec![detection(1, 0.6), detection(1, 0.4), detection(15, 0.9)];
        assert_eq!(count_people(&detections, &config), 1);
    }

    #[test]
    fn no_detections_means_zero_people() {
        assert_eq!(count_people(&[], &DetectionConfig::default()), 0);
    }

    #[test]
    fn counter_resizes_before_detection() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("crowd.png");
        RgbImage::new(640, 480).save(&path).unwrap();

        let counter = DetectionCounter::new(FixedDetector {
            detections: vec![detection(15, 0.8), detection(15, 0.7), detection(3, 0.9)],
            seen_size: Cell::new((0, 0)),
        });

        assert_eq!(counter.count(&path).unwrap(), 2);
        assert_eq!(counter.detector.seen_size.get(), (300, 300));
    }

    #[test]
    fn undecodable_image_is_an_error_not_zero() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.jpg");
        std::fs::write(&path, b"this is not a jpeg").unwrap();

        let counter = DetectionCounter::new(FixedDetector {
            detections: Vec::new(),
            seen_size: Cell::new((0, 0)),
        });

        assert!(matches!(
            counter.count(&path),
            Err(CountError::Decode { .. })
        ));
    }
}
