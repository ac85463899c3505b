//! Diff engine
//!
//! Two pure functions over two immutable collections of one element type:
//!
//! - [`diff`]: structural, by value equality (names, enum sets, usages)
//! - [`deep_diff`]: by identity (`DiffCapable::is_same`), reporting content
//!   changes of matched elements as [`Change`]s
//!
//! Both return a [`Specifier`]. Inputs are never mutated.

mod specifier;
mod traits;

pub use specifier::{deep_diff, diff, Specifier};
pub use traits::{Change, DiffCapable, Difference, NoDiff};
