//! Configuration
//!
//! One YAML-loadable document (schema version 1) covering the node builder
//! and the parallel batch build:
//!
//! ```yaml
//! version: 1
//! builder:
//!   library_mode: false
//!   tracked_annotations:
//!     - org/jetbrains/annotations/NotNull
//! parallel:
//!   num_threads: 0
//! ```

pub mod depgraph_config;
pub mod error;

pub use depgraph_config::{BuilderConfig, DepGraphConfig, ParallelConfig, SUPPORTED_VERSIONS};
pub use error::{ConfigError, ConfigResult};
