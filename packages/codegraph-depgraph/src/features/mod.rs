//! Feature modules
//!
//! Bottom-up: usage → diff → node → annotation_hash → builder → index →
//! storage. Each feature only depends on the ones before it.

pub mod annotation_hash;
pub mod builder;
pub mod diff;
pub mod index;
pub mod node;
pub mod storage;
pub mod usage;
