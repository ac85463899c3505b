//! Usage taxonomy
//!
//! Typed facts "the owning unit references target T in manner M". Stored in
//! plain `HashSet`s; equality is structural over (kind, owner, payload).

mod types;

pub use types::{Usage, UsageKind};
