/// Tests for instance expansion, namespacing and overrides
use crate::builder::{build_scene, SceneBuilder};
use crate::expanded::ExpandedProps;
use serde_json::json;
use std::sync::Arc;
use vellum_common::DiagnosticCode;
use vellum_model::*;

fn card_component() -> (ComponentDef, Vec<Node>) {
    let component = ComponentDef::new("card", "card_root").with_param(
        "title",
        ParamType::String,
        json!("Untitled"),
        "card_title",
        "/props/text",
    );
    let nodes = vec![
        Node::container("card_root").with_children(["card_title", "card_body"]),
        Node::text("card_title", "Title"),
        Node::text("card_body", "Body"),
    ];
    (component, nodes)
}

fn document_with_two_cards() -> EditorDocument {
    let (component, component_nodes) = card_component();
    let mut doc = EditorDocument::new("doc")
        .with_node(
            Node::container("n_root")
                .with_auto_layout(AutoLayout::vertical())
                .with_children(["a", "b"]),
        )
        .with_node(Node::instance("a", "card").with_override("title", json!("First")))
        .with_node(
            Node::instance("b", "card")
                .with_override("title", json!("Second"))
                .with_override("/card_body/props/text", json!("Other body")),
        )
        .with_frame(Frame::new("f1", "n_root", Rect::new(0.0, 0.0, 320.0, 480.0)))
        .with_component(component);
    for node in component_nodes {
        doc = doc.with_node(node);
    }
    doc
}

fn text_of(props: &ExpandedProps) -> &str {
    match props {
        ExpandedProps::Text(text) => &text.text,
        other => panic!("expected text props, got {:?}", other),
    }
}

#[test]
fn test_plain_nodes_copy_through() {
    let doc = EditorDocument::new("doc")
        .with_node(Node::container("root").with_children(["t"]))
        .with_node(Node::text("t", "Hi"))
        .with_frame(Frame::new("f1", "root", Rect::new(0.0, 0.0, 100.0, 100.0)));

    let scene = build_scene(&doc, "f1").unwrap();
    assert_eq!(scene.root_id, "root");
    assert_eq!(scene.len(), 2);

    let text = scene.node("t").unwrap();
    assert_eq!(text.patch_target.as_deref(), Some("t"));
    assert_eq!(text.parent.as_deref(), Some("root"));
    assert_eq!(text_of(&text.props), "Hi");
    assert!(scene.diagnostics.is_empty());
}

#[test]
fn test_instance_clones_are_namespaced() {
    let scene = build_scene(&document_with_two_cards(), "f1").unwrap();

    let wrapper = scene.node("a").unwrap();
    assert_eq!(wrapper.source_type, NodeType::Instance);
    assert_eq!(wrapper.node_type(), NodeType::Container);
    assert_eq!(wrapper.patch_target.as_deref(), Some("a"));
    assert_eq!(wrapper.child_ids, vec!["a::card_root".to_string()]);

    let cloned_root = scene.node("a::card_root").unwrap();
    assert_eq!(cloned_root.patch_target, None);
    assert_eq!(cloned_root.source_id, "card_root");
    assert_eq!(
        cloned_root.child_ids,
        vec!["a::card_title".to_string(), "a::card_body".to_string()]
    );
    assert!(scene.node("b::card_title").is_some());
    assert!(scene.node("card_title").is_none());
}

#[test]
fn test_overrides_do_not_leak_between_instances() {
    let scene = build_scene(&document_with_two_cards(), "f1").unwrap();

    assert_eq!(text_of(&scene.node("a::card_title").unwrap().props), "First");
    assert_eq!(text_of(&scene.node("b::card_title").unwrap().props), "Second");
    assert_eq!(text_of(&scene.node("a::card_body").unwrap().props), "Body");
    assert_eq!(text_of(&scene.node("b::card_body").unwrap().props), "Other body");
}

#[test]
fn test_overrides_leave_document_untouched() {
    let doc = document_with_two_cards();
    build_scene(&doc, "f1").unwrap();
    assert_eq!(
        doc.node("card_title").unwrap().props,
        NodeProps::Text(TextProps::new("Title"))
    );
}

#[test]
fn test_param_default_applies_without_override() {
    let (component, nodes) = card_component();
    let mut doc = EditorDocument::new("doc")
        .with_node(Node::instance("a", "card"))
        .with_frame(Frame::new("f1", "a", Rect::new(0.0, 0.0, 100.0, 100.0)))
        .with_component(component);
    for node in nodes {
        doc = doc.with_node(node);
    }

    let scene = build_scene(&doc, "f1").unwrap();
    assert_eq!(text_of(&scene.node("a::card_title").unwrap().props), "Untitled");
}

#[test]
fn test_invalid_override_is_skipped_with_diagnostic() {
    let mut doc = document_with_two_cards();
    let node = Node::instance("a", "card")
        .with_override("title", json!(42))
        .with_override("/missing/props/text", json!("x"))
        .with_override("/card_body/style/opacity", json!(0.5));
    doc.nodes.insert("a".to_string(), Arc::new(node));

    let scene = build_scene(&doc, "f1").unwrap();
    let invalid: Vec<_> = scene
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::InvalidOverride)
        .collect();
    assert_eq!(invalid.len(), 2);
    assert_eq!(text_of(&scene.node("a::card_title").unwrap().props), "Untitled");
    assert_eq!(scene.node("a::card_body").unwrap().style.opacity, 0.5);
}

#[test]
fn test_dangling_component_yields_empty_wrapper() {
    let doc = EditorDocument::new("doc")
        .with_node(Node::container("root").with_children(["i"]))
        .with_node(Node::instance("i", "ghost"))
        .with_frame(Frame::new("f1", "root", Rect::new(0.0, 0.0, 100.0, 100.0)));

    let scene = build_scene(&doc, "f1").unwrap();
    assert!(scene.node("i").unwrap().child_ids.is_empty());
    assert_eq!(scene.diagnostics[0].code, DiagnosticCode::DanglingComponent);
}

#[test]
fn test_instance_cycle_is_omitted() {
    // loop_a contains an instance of loop_b, which contains an instance of loop_a
    let doc = EditorDocument::new("doc")
        .with_node(Node::container("root").with_children(["start"]))
        .with_node(Node::instance("start", "loop_a"))
        .with_node(Node::container("a_root").with_children(["a_inner"]))
        .with_node(Node::instance("a_inner", "loop_b"))
        .with_node(Node::container("b_root").with_children(["b_inner"]))
        .with_node(Node::instance("b_inner", "loop_a"))
        .with_component(ComponentDef::new("loop_a", "a_root"))
        .with_component(ComponentDef::new("loop_b", "b_root"))
        .with_frame(Frame::new("f1", "root", Rect::new(0.0, 0.0, 100.0, 100.0)));

    let scene = build_scene(&doc, "f1").unwrap();

    assert!(scene.node("start::a_inner::b_root").is_some());
    assert!(scene.node("start::a_inner::b_inner").is_none());
    assert!(scene
        .node("start::a_inner::b_root")
        .unwrap()
        .child_ids
        .is_empty());
    assert_eq!(
        scene
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::InstanceCycle)
            .count(),
        1
    );
}

#[test]
fn test_self_referencing_component_surface() {
    let doc = EditorDocument::new("doc")
        .with_node(Node::container("c_root").with_children(["self_ref"]))
        .with_node(Node::instance("self_ref", "c"))
        .with_component(ComponentDef::new("c", "c_root"))
        .with_frame(
            Frame::new("f_c", "c_root", Rect::new(0.0, 0.0, 100.0, 100.0)).with_kind(
                FrameKind::Component {
                    component_id: Some("c".to_string()),
                },
            ),
        );

    let scene = build_scene(&doc, "f_c").unwrap();
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.diagnostics[0].code, DiagnosticCode::InstanceCycle);
}

#[test]
fn test_expanded_ids_for_maps_component_nodes_to_clones() {
    let scene = build_scene(&document_with_two_cards(), "f1").unwrap();
    let ids = scene.expanded_ids_for(&["card_title".to_string(), "n_root".to_string()]);
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["a::card_title", "b::card_title", "n_root"]);
}

#[test]
fn test_expanded_ids_for_instance_includes_its_clones() {
    let scene = build_scene(&document_with_two_cards(), "f1").unwrap();
    let ids = scene.expanded_ids_for(&["b".to_string()]);
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["b", "b::card_body", "b::card_root", "b::card_title"]);
}

#[test]
fn test_unknown_frame_and_missing_root() {
    let doc = EditorDocument::new("doc")
        .with_frame(Frame::new("f1", "gone", Rect::new(0.0, 0.0, 10.0, 10.0)));
    assert_eq!(
        build_scene(&doc, "nope").unwrap_err().code(),
        DiagnosticCode::FrameNotFound
    );
    assert_eq!(
        build_scene(&doc, "f1").unwrap_err().code(),
        DiagnosticCode::MissingRoot
    );
}

#[test]
fn test_builder_reuses_scene_for_same_document() {
    let doc = Arc::new(document_with_two_cards());
    let mut builder = SceneBuilder::new();

    let first = builder.build(&doc, "f1").unwrap();
    let second = builder.build(&doc, "f1").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let edited = Arc::new((*doc).clone());
    let third = builder.build(&edited, "f1").unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(*first, *third);
}

#[test]
fn test_expansion_is_deterministic() {
    let doc = document_with_two_cards();
    let first = build_scene(&doc, "f1").unwrap();
    for _ in 0..5 {
        assert_eq!(build_scene(&doc, "f1").unwrap(), first);
    }
    let order = first.pre_order();
    assert_eq!(order[0], "n_root");
    assert_eq!(order[1], "a");
    assert_eq!(order[2], "a::card_root");
}
