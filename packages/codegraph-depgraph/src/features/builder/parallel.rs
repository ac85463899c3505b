//! Parallel batch build
//!
//! Independent compiled units are built on a dedicated rayon pool with no
//! shared mutable state. A failing unit yields its own `Err`; raising the
//! cancel flag aborts the whole batch with `DepGraphError::Cancelled`.

use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::events::ClassFileEvent;
use super::node_builder::NodeBuilder;
use crate::config::DepGraphConfig;
use crate::errors::{DepGraphError, Result};
use crate::features::annotation_hash::AnnotationTrackerRegistry;
use crate::features::node::Node;

/// One compiled unit as delivered by the class-file reader
pub trait ClassFileSource: Send + Sync {
    fn path(&self) -> &Path;

    /// Read the unit; I/O and decoding failures surface here
    fn events(&self) -> Result<Vec<ClassFileEvent>>;
}

/// Source whose events are already in memory
#[derive(Debug, Clone)]
pub struct EventsSource {
    path: std::path::PathBuf,
    events: Vec<ClassFileEvent>,
}

impl EventsSource {
    pub fn new(path: impl Into<std::path::PathBuf>, events: Vec<ClassFileEvent>) -> Self {
        Self {
            path: path.into(),
            events,
        }
    }
}

impl ClassFileSource for EventsSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn events(&self) -> Result<Vec<ClassFileEvent>> {
        Ok(self.events.clone())
    }
}

/// Build one node per source, in source order
pub fn build_nodes<S: ClassFileSource>(
    sources: &[S],
    config: &DepGraphConfig,
    cancel: &AtomicBool,
) -> Result<Vec<Result<Node>>> {
    let start = Instant::now();
    let trackers = Arc::new(AnnotationTrackerRegistry::from_config(&config.builder));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel.effective_threads())
        .thread_name(|i| format!("depgraph-builder-{}", i))
        .build()
        .map_err(|e| DepGraphError::ThreadPool(e.to_string()))?;

    let results: Vec<Result<Node>> = pool.install(|| {
        sources
            .par_iter()
            .map(|source| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(DepGraphError::Cancelled);
                }
                let events = source.events()?;
                NodeBuilder::build(source.path(), events, &config.builder, Arc::clone(&trackers))
            })
            .collect()
    });

    if cancel.load(Ordering::Relaxed) {
        tracing::info!(units = sources.len(), "batch build cancelled");
        return Err(DepGraphError::Cancelled);
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    for (source, result) in sources.iter().zip(&results) {
        if let Err(e) = result {
            tracing::warn!(path = %source.path().display(), error = %e, "failed to build node");
        }
    }
    tracing::info!(
        units = sources.len(),
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batch build finished"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParallelConfig;
    use crate::shared::models::JvmFlags;

    fn class_source(name: &str) -> EventsSource {
        EventsSource::new(
            format!("out/{}.class", name),
            vec![ClassFileEvent::ClassHeader {
                access: JvmFlags::PUBLIC,
                name: name.to_string(),
                signature: None,
                super_name: None,
                interfaces: vec![],
            }],
        )
    }

    fn config() -> DepGraphConfig {
        DepGraphConfig {
            parallel: ParallelConfig { num_threads: 2 },
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let sources = vec![
            class_source("a/A"),
            EventsSource::new("out/broken.class", vec![]),
            class_source("a/C"),
        ];
        let results = build_nodes(&sources, &config(), &AtomicBool::new(false)).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().reference_id().name(), "a/A");
        assert!(matches!(
            results[1],
            Err(DepGraphError::CorruptClassFile { .. })
        ));
        assert_eq!(results[2].as_ref().unwrap().reference_id().name(), "a/C");
    }

    #[test]
    fn test_cancelled_batch() {
        let sources = vec![class_source("a/A"), class_source("a/B")];
        let err = build_nodes(&sources, &config(), &AtomicBool::new(true)).unwrap_err();
        assert!(err.is_cancellation());
    }
}
