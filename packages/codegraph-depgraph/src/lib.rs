/*
 * Codegraph DepGraph - Dependency graph core for incremental JVM builds
 *
 * Feature-First Architecture:
 * - shared/      : Common models (ReferenceId, JvmFlags, TypeRepr) and hashing
 * - features/    : usage → diff → node → annotation_hash → builder → index → storage
 * - config/      : YAML configuration
 *
 * Nodes are immutable per-revision snapshots of compiled units; comparing two
 * revisions yields lazily evaluated Specifiers that impact analysis queries.
 */

#![allow(clippy::type_complexity)] // Specifier aliases over GAT diffs
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{BuilderConfig, ConfigError, DepGraphConfig, ParallelConfig};
pub use errors::{DepGraphError, Result};
pub use features::builder::{build_nodes, ClassFileEvent, ClassFileSource, NodeBuilder};
pub use features::diff::{deep_diff, diff, Change, DiffCapable, Difference, Specifier};
pub use features::index::{differentiate, BackDependencyIndex, NodeGraph, SubclassesIndex};
pub use features::node::{JvmClass, JvmModule, Node, NodeDiff, NodeKind};
pub use features::storage::{load_graph, save_graph, Externalizable};
pub use features::usage::{Usage, UsageKind};
pub use shared::models::{JvmFlags, ReferenceId, TypeRepr};
