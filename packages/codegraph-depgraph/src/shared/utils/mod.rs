//! Shared utilities

pub mod hashing;

pub use hashing::{descriptor_hash, fx_hash, hash64, StreamingHash64};
