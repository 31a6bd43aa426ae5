//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// All events emitted while sorting a folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Per-file events
    File(FileEvent),
    /// Run-level events
    Pipeline(PipelineEvent),
}

/// Steps completed (or failed) for a single image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FileEvent {
    /// The untouched original was copied to the backup folder
    BackedUp { file_name: String, backup: PathBuf },
    /// The person counter returned a count
    Counted { file_name: String, count: usize },
    /// The primary output and its duplicates were written
    CopiesCreated {
        file_name: String,
        primary: String,
        copies: usize,
    },
    /// Dry run: what would have been written
    Planned {
        file_name: String,
        primary: String,
        copies: usize,
    },
    /// The source was deleted from the input folder
    SourceRemoved { file_name: String },
    /// Processing this file stopped; the source stays in place
    Failed { file_name: String, message: String },
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// The listing was taken
    Started { input: PathBuf, images: usize },
    /// About to start on the nth processable image
    Progress(FileProgress),
    /// The listing contained no processable image at all
    NoImagesFound,
    /// The cancellation flag was observed between files
    Cancelled { remaining: usize },
    /// The run finished
    Completed { summary: RunSummary },
}

/// Position within the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProgress {
    /// Images finished so far (successful or not)
    pub completed: usize,
    /// Processable images in the listing
    pub total: usize,
    /// Image about to be processed
    pub current_path: PathBuf,
}

/// Counters reported when a run completes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::File(event) => fmt::Display::fmt(event, f),
            Event::Pipeline(event) => fmt::Display::fmt(event, f),
        }
    }
}

impl fmt::Display for FileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEvent::BackedUp { file_name, .. } => {
                write!(f, "Copied '{}' to backup folder", file_name)
            }
            FileEvent::Counted { file_name, count } => {
                write!(f, "Found {} person(s) in '{}'", count, file_name)
            }
            FileEvent::CopiesCreated {
                file_name,
                primary,
                copies,
            } => write!(
                f,
                "Copied and renamed '{}' to '{}' ({} cop{} in total)",
                file_name,
                primary,
                copies,
                if *copies == 1 { "y" } else { "ies" }
            ),
            FileEvent::Planned {
                file_name,
                primary,
                copies,
            } => write!(
                f,
                "Would rename '{}' to '{}' and keep {} cop{}",
                file_name,
                primary,
                copies,
                if *copies == 1 { "y" } else { "ies" }
            ),
            FileEvent::SourceRemoved { file_name } => {
                write!(f, "Removed '{}' from original folder", file_name)
            }
            FileEvent::Failed { file_name, message } => {
                write!(f, "Skipped '{}': {}", file_name, message)
            }
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::Started { input, images } => {
                write!(f, "Found {} picture(s) in {}", images, input.display())
            }
            PipelineEvent::Progress(p) => write!(
                f,
                "[{}/{}] {}",
                p.completed + 1,
                p.total,
                p.current_path.display()
            ),
            PipelineEvent::NoImagesFound => write!(f, "No pictures found"),
            PipelineEvent::Cancelled { remaining } => {
                write!(f, "Cancelled with {} picture(s) left untouched", remaining)
            }
            PipelineEvent::Completed { summary } => write!(
                f,
                "Processed {} picture(s), {} failed, {} other file(s) skipped",
                summary.processed, summary.failed, summary.skipped
            ),
        }
    }
}
