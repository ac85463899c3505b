//! Persistence round-trips through the public API

use std::sync::Arc;

use codegraph_depgraph::config::BuilderConfig;
use codegraph_depgraph::features::annotation_hash::AnnotationTrackerRegistry;
use codegraph_depgraph::features::builder::{ClassFileEvent, FieldOp, Insn};
use codegraph_depgraph::features::node::AnnotationValue;
use codegraph_depgraph::features::storage::{read_graph, write_graph};
use codegraph_depgraph::{
    differentiate, load_graph, save_graph, JvmFlags, Node, NodeBuilder,
};
use pretty_assertions::assert_eq;

fn sample_node(path: &str, name: &str) -> Node {
    let config = BuilderConfig {
        tracked_annotations: vec!["a/Tracked".to_string()],
        ..Default::default()
    };
    let trackers = Arc::new(AnnotationTrackerRegistry::from_config(&config));
    let events = vec![
        ClassFileEvent::ClassHeader {
            access: JvmFlags::PUBLIC | JvmFlags::FINAL,
            name: name.to_string(),
            signature: Some("<T:La/Bound;>Ljava/lang/Object;".to_string()),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: vec!["a/I".to_string()],
        },
        ClassFileEvent::Annotation {
            descriptor: "La/Tracked;".to_string(),
            args: vec![("value".to_string(), AnnotationValue::string("x"))],
        },
        ClassFileEvent::Field {
            access: JvmFlags::PRIVATE,
            name: "count".to_string(),
            descriptor: "J".to_string(),
            signature: None,
        },
        ClassFileEvent::Method {
            access: JvmFlags::PUBLIC,
            name: "run".to_string(),
            descriptor: "([Ljava/lang/String;)V".to_string(),
            signature: None,
            exceptions: vec!["java/io/IOException".to_string()],
        },
        ClassFileEvent::Instruction(Insn::Field {
            op: FieldOp::GetStatic,
            owner: "a/Config".to_string(),
            name: "LIMIT".to_string(),
            descriptor: "I".to_string(),
        }),
        ClassFileEvent::MemberEnd,
    ];
    NodeBuilder::build(path, events, &config, trackers).unwrap()
}

#[test]
fn test_built_nodes_survive_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("revision.graph");
    let nodes = vec![
        sample_node("out/a/A.class", "a/A"),
        sample_node("out/a/B.class", "a/B"),
    ];

    save_graph(&path, &nodes).unwrap();
    let loaded = load_graph(&path).unwrap();

    assert_eq!(loaded, nodes);
    assert!(differentiate(&nodes, &loaded).unchanged());
}

#[test]
fn test_in_memory_round_trip_keeps_content_hashes() {
    let nodes = vec![sample_node("out/a/A.class", "a/A")];
    let bytes = write_graph(Vec::new(), &nodes).unwrap();
    let loaded = read_graph(bytes.as_slice()).unwrap();

    let before = nodes[0].as_class().unwrap();
    let after = loaded[0].as_class().unwrap();
    assert_eq!(after.annotations(), before.annotations());
    assert!(after.annotations()[0].content_hash().is_some());
}

#[test]
fn test_truncated_snapshot_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("revision.graph");
    let bytes = write_graph(Vec::new(), &[sample_node("out/a/A.class", "a/A")]).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    let err = load_graph(&path).unwrap_err();
    assert!(err.to_string().contains("truncated"), "{err}");
}
