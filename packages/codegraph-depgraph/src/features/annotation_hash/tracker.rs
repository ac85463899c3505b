//! Registry of annotation-change trackers
//!
//! Content is hashed only for annotation types some tracker cares about.
//! Everything else compares by annotation class alone.

use rustc_hash::FxHashSet;
use std::sync::Arc;

use super::hasher::content_hash;
use crate::config::BuilderConfig;
use crate::features::node::AnnotationValue;

/// Strategy deciding which annotation types need content tracking
pub trait AnnotationTracker: Send + Sync {
    fn name(&self) -> &str;

    /// `annotation_class` is a binary name (`a/b/Ann`)
    fn is_tracked(&self, annotation_class: &str) -> bool;
}

/// Tracks a fixed set of annotation classes
#[derive(Debug, Default)]
pub struct NamedAnnotationTracker {
    names: FxHashSet<String>,
}

impl NamedAnnotationTracker {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }
}

impl AnnotationTracker for NamedAnnotationTracker {
    fn name(&self) -> &str {
        "named"
    }

    fn is_tracked(&self, annotation_class: &str) -> bool {
        self.names.contains(annotation_class)
    }
}

/// Tracks every annotation
#[derive(Debug, Default)]
pub struct AllAnnotationsTracker;

impl AnnotationTracker for AllAnnotationsTracker {
    fn name(&self) -> &str {
        "all"
    }

    fn is_tracked(&self, _annotation_class: &str) -> bool {
        true
    }
}

#[derive(Clone, Default)]
pub struct AnnotationTrackerRegistry {
    trackers: Vec<Arc<dyn AnnotationTracker>>,
}

impl AnnotationTrackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BuilderConfig) -> Self {
        let mut registry = Self::new();
        if config.track_all_annotations {
            registry.register(Arc::new(AllAnnotationsTracker));
        }
        if !config.tracked_annotations.is_empty() {
            registry.register(Arc::new(NamedAnnotationTracker::new(
                config.tracked_annotations.iter().cloned(),
            )));
        }
        registry
    }

    pub fn register(&mut self, tracker: Arc<dyn AnnotationTracker>) {
        tracing::debug!(tracker = tracker.name(), "registered annotation tracker");
        self.trackers.push(tracker);
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn is_tracked(&self, annotation_class: &str) -> bool {
        self.trackers.iter().any(|t| t.is_tracked(annotation_class))
    }

    /// Content hash for tracked annotation types, `None` otherwise
    pub fn content_hash(
        &self,
        annotation_class: &str,
        args: &[(String, AnnotationValue)],
    ) -> Option<u64> {
        self.is_tracked(annotation_class).then(|| content_hash(args))
    }
}

impl std::fmt::Debug for AnnotationTrackerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.trackers.iter().map(|t| t.name()).collect();
        f.debug_struct("AnnotationTrackerRegistry")
            .field("trackers", &names)
            .finish()
    }
}
