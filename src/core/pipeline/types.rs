//! Records produced by a pipeline run.

use crate::core::naming::split_file_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A processable image found in the input listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path at discovery time
    pub path: PathBuf,
    /// Full file name, e.g. `a.jpg`
    pub file_name: String,
    /// File name without the extension, e.g. `a`
    pub base: String,
    /// Extension with its dot, e.g. `.jpg`
    pub extension: String,
}

impl ImageFile {
    pub fn new(dir: &Path, file_name: &str) -> Self {
        let (base, extension) = split_file_name(file_name);
        Self {
            path: dir.join(file_name),
            file_name: file_name.to_string(),
            base: base.to_string(),
            extension: extension.to_string(),
        }
    }
}

/// The per-file steps, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    Backup,
    Count,
    PrimaryCopy,
    DuplicateCopy,
    RemoveSource,
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStep::Backup => write!(f, "backup"),
            ProcessingStep::Count => write!(f, "person count"),
            ProcessingStep::PrimaryCopy => write!(f, "output copy"),
            ProcessingStep::DuplicateCopy => write!(f, "duplicate copy"),
            ProcessingStep::RemoveSource => write!(f, "source removal"),
        }
    }
}

/// What happened to one image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    pub source: PathBuf,
    /// Person count, once the counter has answered
    pub count: Option<usize>,
    /// Backup copy, once written
    pub backup: Option<PathBuf>,
    /// Output files written (or planned, in a dry run), primary first
    pub outputs: Vec<PathBuf>,
    pub source_removed: bool,
    /// Step that stopped processing, if any
    pub failed_step: Option<ProcessingStep>,
    pub error: Option<String>,
}

impl ProcessingOutcome {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            count: None,
            backup: None,
            outputs: Vec::new(),
            source_removed: false,
            failed_step: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub(crate) fn fail(&mut self, step: ProcessingStep, message: String) {
        self.failed_step = Some(step);
        self.error = Some(message);
    }
}

/// Aggregate result of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderProcessingSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    /// Regular files in the listing
    pub scanned: usize,
    /// Images that went through every step
    pub processed: usize,
    /// Files that are not processable images
    pub skipped: usize,
    /// Images that stopped at some step
    pub failed: usize,
    /// Whether the listing held any processable image at all
    pub images_found: bool,
    /// Whether the run stopped early on the cancellation flag
    pub cancelled: bool,
    pub dry_run: bool,
    pub duration_ms: u64,
    /// Finalized outcomes, in processing order
    pub outcomes: Vec<ProcessingOutcome>,
}

impl FolderProcessingSummary {
    pub(crate) fn new(input_dir: &Path, output_dir: &Path, backup_dir: &Path, dry_run: bool) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            backup_dir: backup_dir.to_path_buf(),
            started_at: Utc::now(),
            scanned: 0,
            processed: 0,
            skipped: 0,
            failed: 0,
            images_found: false,
            cancelled: false,
            dry_run,
            duration_ms: 0,
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, outcome: ProcessingOutcome) {
        if outcome.is_success() {
            self.processed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Outcomes that did not complete
    pub fn failures(&self) -> impl Iterator<Item = &ProcessingOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Total files written (or planned) to the output folder
    pub fn total_outputs(&self) -> usize {
        self.outcomes.iter().map(|o| o.outputs.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_file_splits_its_name() {
        let image = ImageFile::new(Path::new("/in"), "party.2024.JPG");
        assert_eq!(image.path, PathBuf::from("/in/party.2024.JPG"));
        assert_eq!(image.base, "party.2024");
        assert_eq!(image.extension, ".JPG");
    }

    #[test]
    fn summary_counts_success_and_failure() {
        let mut summary =
            FolderProcessingSummary::new(Path::new("in"), Path::new("out"), Path::new("bak"), false);

        let mut ok = ProcessingOutcome::new(PathBuf::from("in/a.jpg"));
        ok.outputs.push(PathBuf::from("out/a_(1 personnes).jpg"));
        summary.record(ok);

        let mut bad = ProcessingOutcome::new(PathBuf::from("in/b.png"));
        bad.fail(ProcessingStep::Count, "model missing".to_string());
        summary.record(bad);

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_outputs(), 1);
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn summary_is_serializable() {
        let summary =
            FolderProcessingSummary::new(Path::new("in"), Path::new("out"), Path::new("bak"), true);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"images_found\":false"));
        assert!(json.contains("\"dry_run\":true"));
    }
}
