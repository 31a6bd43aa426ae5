//! # Error Module
//!
//! Error types for the people sorter.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Fatal vs per-file** - only precondition errors stop a run; everything
//!   else is recorded against the file that caused it

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SorterError {
    #[error("Cannot start: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("File operation failed: {0}")]
    FileOp(#[from] FileOpError),

    #[error("Person counting failed: {0}")]
    Count(#[from] CountError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Problems with the folders handed to the pipeline.
///
/// These abort the whole run before any file is touched.
#[derive(Error, Debug)]
pub enum PreconditionError {
    #[error("No {role} folder was selected")]
    MissingPath { role: &'static str },

    #[error("Input folder not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Input path is not a folder: {path}")]
    InputNotDirectory { path: PathBuf },

    #[error("Failed to read input folder {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The {role} folder must differ from the input folder: {path}")]
    SameAsInput { role: &'static str, path: PathBuf },

    #[error("Failed to create {role} folder {path}: {source}")]
    CreateFolder {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A copy or delete that failed for one file
#[derive(Error, Debug)]
pub enum FileOpError {
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while counting the people in one image
#[derive(Error, Debug)]
pub enum CountError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Detector failed on {path}: {reason}")]
    Detector { path: PathBuf, reason: String },

    #[error("Failed to start detector `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No count recorded for {name}")]
    Missing { name: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SorterError>;
