//! Error types for codegraph-depgraph
//!
//! Provides unified error handling across the crate. Diff computation never
//! fails; errors come from node building, persistence and configuration.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for dependency-graph operations
#[derive(Debug, Error)]
pub enum DepGraphError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or inconsistent compiled unit. Fatal for that unit only.
    #[error("Corrupt class file {}: {reason}", path.display())]
    CorruptClassFile { path: PathBuf, reason: String },

    /// A JVM descriptor or signature that could not be parsed
    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// Builder received an event that is not valid in its current state
    #[error("Unexpected event '{event}' in state '{state}' while reading {}", path.display())]
    UnexpectedEvent {
        path: PathBuf,
        event: &'static str,
        state: &'static str,
    },

    /// Persisted data could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// In-flight build was cancelled (not a build failure)
    #[error("Build cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DepGraphError {
    /// Create a corrupt-input error for one compiled unit
    pub fn corrupt(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        DepGraphError::CorruptClassFile {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-descriptor error
    pub fn malformed(descriptor: impl Into<String>) -> Self {
        DepGraphError::MalformedDescriptor(descriptor.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        DepGraphError::Decode(msg.into())
    }

    /// Cancellation is propagated, never reported as a unit failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DepGraphError::Cancelled)
    }
}

/// Result type alias for dependency-graph operations
pub type Result<T> = std::result::Result<T, DepGraphError>;
