//! # Pipeline Module
//!
//! Orchestrates sorting one folder.
//!
//! ## Per-file Stages
//! 1. **Backup** - copy the untouched original to the backup folder
//! 2. **Count** - ask the [`PersonCounter`](crate::core::counter::PersonCounter)
//! 3. **Name** - derive output names from the count
//! 4. **Copy** - write the primary output, then its duplicates
//! 5. **Remove** - delete the source from the input folder
//!
//! ## Concurrency
//! Strictly sequential: one file is finished before the next is started.

mod executor;
mod types;

pub use executor::{process_folder, FolderPipeline, PipelineBuilder, PipelineConfig};
pub use types::{FolderProcessingSummary, ImageFile, ProcessingOutcome, ProcessingStep};
