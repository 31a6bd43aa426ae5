//! # Core Module
//!
//! The UI-agnostic sorting engine.
//!
//! ## Modules
//! - `classifier` - Decides which files are processable images
//! - `naming` - Builds backup, output and duplicate file names
//! - `counter` - Counts the people in an image
//! - `pipeline` - Runs the per-file steps over a folder

pub mod classifier;
pub mod counter;
pub mod naming;
pub mod pipeline;

// Re-export commonly used types
pub use classifier::{FileClassifier, ImageFormat};
pub use counter::PersonCounter;
pub use naming::{NamingPolicy, NamingResult};
pub use pipeline::{FolderPipeline, FolderProcessingSummary, ProcessingOutcome};
