//! # People Sorter
//!
//! Sorts a folder of photos by how many people appear in each one.
//!
//! Every image is backed up, renamed to carry its person count
//! (`a.jpg` -> `a_(2 personnes).jpg`), copied once per person into the
//! output folder, and finally removed from the input folder.
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Classification, naming, counting and the folder pipeline
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `config` - Config file and default folder layout

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::pipeline::{process_folder, FolderPipeline, FolderProcessingSummary};
pub use error::{Result, SorterError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG`
/// controls the level; output goes to stderr.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
