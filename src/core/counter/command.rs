//! Detector backed by an external program.
//!
//! The program receives the resized image as PNG on stdin and must print a
//! JSON array of detections on stdout:
//!
//! ```json
//! [{"class_id": 15, "confidence": 0.87}, {"class_id": 9, "confidence": 0.4}]
//! ```
//!
//! Any model runtime can sit behind this without the crate linking it.

use super::{Detection, Detector};
use crate::error::CountError;
use image::DynamicImage;
use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Runs `program args...` once per image
#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: String,
    args: Vec<String>,
}

impl CommandDetector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments passed before the image is streamed in
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Split a command line on whitespace into program + args.
    ///
    /// There is no quoting: a path or argument containing spaces has to go
    /// through [`CommandDetector::from_parts`] instead.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts.collect()))
    }

    /// Build from a command plus separately supplied arguments.
    ///
    /// With no extra arguments `command` is split like
    /// [`CommandDetector::from_command_line`]. Otherwise it is taken verbatim
    /// as the program, spaces included, and `args` are passed unchanged.
    pub fn from_parts(command: &str, args: Vec<String>) -> Option<Self> {
        if args.is_empty() {
            return Self::from_command_line(command);
        }
        let program = command.trim();
        if program.is_empty() {
            return None;
        }
        Some(Self::new(program).with_args(args))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn encode(path: &Path, image: &DynamicImage) -> Result<Vec<u8>, CountError> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, image::ImageFormat::Png)
            .map_err(|e| CountError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(buffer.into_inner())
    }
}

impl Detector for CommandDetector {
    fn detect(&self, path: &Path, image: &DynamicImage) -> Result<Vec<Detection>, CountError> {
        let png = Self::encode(path, image)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CountError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from another thread so a chatty child cannot deadlock us
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || {
                let _ = stdin.write_all(&png);
            })
        });

        let output = child.wait_with_output().map_err(|e| CountError::Detector {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let Some(handle) = writer {
            let _ = handle.join();
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CountError::Detector {
                path: path.to_path_buf(),
                reason: format!("{} ({})", output.status, stderr.trim()),
            });
        }

        let detections: Vec<Detection> =
            serde_json::from_slice(&output.stdout).map_err(|e| CountError::Detector {
                path: path.to_path_buf(),
                reason: format!("unreadable detector output: {}", e),
            })?;

        debug!(
            program = %self.program,
            path = %path.display(),
            detections = detections.len(),
            "detector finished"
        );

        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn tiny_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
    }

    #[test]
    fn command_line_is_split_into_program_and_args() {
        let detector = CommandDetector::from_command_line("python3 detect.py --model ssd").unwrap();
        assert_eq!(detector.program(), "python3");
        assert_eq!(detector.args, vec!["detect.py", "--model", "ssd"]);
    }

    #[test]
    fn blank_command_line_is_rejected() {
        assert!(CommandDetector::from_command_line("   ").is_none());
    }

    #[test]
    fn explicit_args_keep_spaces_intact() {
        let detector = CommandDetector::from_parts(
            "/opt/My Models/detect",
            vec!["--weights".to_string(), "ssd v2.bin".to_string()],
        )
        .unwrap();
        assert_eq!(detector.program(), "/opt/My Models/detect");
        assert_eq!(detector.args, vec!["--weights", "ssd v2.bin"]);
    }

    #[test]
    fn without_explicit_args_the_command_is_split() {
        let detector = CommandDetector::from_parts("python3 detect.py", Vec::new()).unwrap();
        assert_eq!(detector.program(), "python3");
        assert_eq!(detector.args, vec!["detect.py"]);
        assert!(CommandDetector::from_parts("  ", vec!["x".to_string()]).is_none());
    }

    #[test]
    fn missing_program_reports_spawn_error() {
        let detector = CommandDetector::new("people-sorter-no-such-detector");
        let result = detector.detect(Path::new("a.png"), &tiny_image());
        assert!(matches!(result, Err(CountError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn parses_json_detections_from_stdout() {
        let detector = CommandDetector::new("sh").with_args(vec![
            "-c".to_string(),
            r#"cat > /dev/null; echo '[{"class_id":15,"confidence":0.9},{"class_id":2,"confidence":0.5}]'"#
                .to_string(),
        ]);

        let detections = detector.detect(Path::new("a.png"), &tiny_image()).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].class_id, 15);
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_a_detector_error() {
        let detector = CommandDetector::new("sh").with_args(vec![
            "-c".to_string(),
            "cat > /dev/null; echo 'model missing' >&2; exit 3".to_string(),
        ]);

        match detector.detect(Path::new("a.png"), &tiny_image()) {
            Err(CountError::Detector { reason, .. }) => assert!(reason.contains("model missing")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn garbage_output_is_a_detector_error() {
        let detector = CommandDetector::new("sh").with_args(vec![
            "-c".to_string(),
            "cat > /dev/null; echo 'three people'".to_string(),
        ]);

        assert!(matches!(
            detector.detect(Path::new("a.png"), &tiny_image()),
            Err(CountError::Detector { .. })
        ));
    }
}
