//! End-to-end incremental scenarios
//!
//! Build nodes from event streams for two revisions, diff them, and check
//! what impact analysis would see.

use std::sync::atomic::AtomicBool;

use codegraph_depgraph::features::builder::{ClassFileEvent, EventsSource, Insn};
use codegraph_depgraph::features::node::{Node, NodeDiff};
use codegraph_depgraph::{
    build_nodes, deep_diff, differentiate, DepGraphConfig, Difference, JvmFlags, NodeGraph,
    ReferenceId, Usage,
};
use pretty_assertions::assert_eq;

fn header(name: &str, super_name: &str) -> ClassFileEvent {
    ClassFileEvent::ClassHeader {
        access: JvmFlags::PUBLIC,
        name: name.to_string(),
        signature: None,
        super_name: Some(super_name.to_string()),
        interfaces: vec![],
    }
}

fn method(name: &str, descriptor: &str) -> ClassFileEvent {
    ClassFileEvent::Method {
        access: JvmFlags::PUBLIC,
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        signature: None,
        exceptions: vec![],
    }
}

fn call(owner: &str, name: &str, descriptor: &str) -> ClassFileEvent {
    ClassFileEvent::Instruction(Insn::Method {
        owner: owner.to_string(),
        name: name.to_string(),
        descriptor: descriptor.to_string(),
    })
}

/// `A.foo()V` calls `B.bar` with the given descriptor; `B` declares `bar`
fn revision(bar_descriptor: &str) -> Vec<EventsSource> {
    vec![
        EventsSource::new(
            "out/a/A.class",
            vec![
                header("a/A", "java/lang/Object"),
                method("foo", "()V"),
                call("a/B", "bar", bar_descriptor),
                ClassFileEvent::MemberEnd,
            ],
        ),
        EventsSource::new(
            "out/a/B.class",
            vec![
                header("a/B", "java/lang/Object"),
                method("bar", bar_descriptor),
                ClassFileEvent::MemberEnd,
            ],
        ),
    ]
}

fn build(sources: &[EventsSource]) -> Vec<Node> {
    let cancel = AtomicBool::new(false);
    build_nodes(sources, &DepGraphConfig::default(), &cancel)
        .unwrap()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn find<'a>(nodes: &'a [Node], name: &str) -> &'a Node {
    nodes
        .iter()
        .find(|n| n.reference_id().name() == name)
        .unwrap_or_else(|| panic!("node {name} missing"))
}

#[test]
fn test_return_type_change_propagates_to_caller_usages() {
    let past = build(&revision("()I"));
    let now = build(&revision("()J"));

    let past_a: Vec<&Usage> = find(&past, "a/A").usages().collect();
    let now_a: Vec<&Usage> = find(&now, "a/A").usages().collect();
    let usages = deep_diff(past_a.iter().copied(), now_a.iter().copied());
    assert_eq!(usages.removed(), &[&Usage::method("a/B", "bar", "()I")]);
    assert_eq!(usages.added(), &[&Usage::method("a/B", "bar", "()J")]);
    assert!(usages.changed().is_empty());

    let past_b = find(&past, "a/B").as_class().unwrap();
    let now_b = find(&now, "a/B").as_class().unwrap();
    let methods = deep_diff(past_b.methods(), now_b.methods());
    assert!(methods.changed().is_empty());
    assert_eq!(methods.added().len(), 1);
    assert_eq!(methods.removed().len(), 1);
    assert_eq!(methods.added()[0].descriptor(), "()J");
}

#[test]
fn test_revision_diff_reports_both_units_changed() {
    let past = build(&revision("()I"));
    let now = build(&revision("()J"));

    let spec = differentiate(&past, &now);
    assert!(spec.added().is_empty());
    assert!(spec.removed().is_empty());

    let mut changed: Vec<&str> = spec
        .changed()
        .iter()
        .filter(|c| !c.diff().unchanged())
        .map(|c| c.now().reference_id().name())
        .collect();
    changed.sort();
    assert_eq!(changed, vec!["a/A", "a/B"]);

    for change in spec.changed() {
        let NodeDiff::Class(class_diff) = change.diff() else {
            panic!("expected class diffs only");
        };
        assert!(!class_diff.super_class_changed());
    }
}

#[test]
fn test_identical_revisions_are_unchanged() {
    let past = build(&revision("()I"));
    let now = build(&revision("()I"));
    assert!(differentiate(&past, &now).unchanged());
}

#[test]
fn test_graph_tracks_subclass_hierarchy_across_build() {
    let sources = vec![
        EventsSource::new("out/a/Base.class", vec![header("a/Base", "java/lang/Object")]),
        EventsSource::new("out/a/Mid.class", vec![header("a/Mid", "a/Base")]),
        EventsSource::new("out/a/Leaf.class", vec![header("a/Leaf", "a/Mid")]),
    ];
    let graph = NodeGraph::new();
    for node in build(&sources) {
        graph.add_node(node);
    }

    assert_eq!(graph.len(), 3);
    let base = ReferenceId::from("a/Base");
    assert_eq!(
        graph.all_subclasses(&base),
        vec![ReferenceId::from("a/Mid"), ReferenceId::from("a/Leaf")]
    );
    let leaf = graph.get(&ReferenceId::from("a/Leaf")).unwrap();
    assert!(leaf.usages().any(|u| u == &Usage::class("a/Mid")));
}

#[test]
fn test_corrupt_unit_does_not_affect_others() {
    let mut sources = revision("()I");
    sources.push(EventsSource::new(
        "out/a/Broken.class",
        vec![method("orphan", "()V")],
    ));
    let cancel = AtomicBool::new(false);
    let results = build_nodes(&sources, &DepGraphConfig::default(), &cancel).unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    let err = results[2].as_ref().unwrap_err();
    assert!(err.to_string().contains("out/a/Broken.class"), "{err}");
}

#[test]
fn test_cancelled_batch_is_not_a_build_error() {
    let cancel = AtomicBool::new(true);
    let err = build_nodes(&revision("()I"), &DepGraphConfig::default(), &cancel).unwrap_err();
    assert!(err.is_cancellation());
}
