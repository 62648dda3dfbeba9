/// Tests for slot expansion
use crate::builder::build_scene;
use crate::expanded::ExpandedProps;
use vellum_model::*;

/// `panel` has a header text and an `actions` slot with one default child
fn panel_document(instance: Node, extra: Vec<Node>) -> EditorDocument {
    let mut doc = EditorDocument::new("doc")
        .with_node(Node::container("root").with_children([instance.id.clone()]))
        .with_node(Node::container("panel_root").with_children(["panel_header", "panel_actions"]))
        .with_node(Node::text("panel_header", "Header"))
        .with_node(Node::slot("panel_actions", "actions").with_children(["panel_default"]))
        .with_node(Node::text("panel_default", "Default action"))
        .with_node(instance)
        .with_component(ComponentDef::new("panel", "panel_root"))
        .with_frame(Frame::new("f1", "root", Rect::new(0.0, 0.0, 400.0, 300.0)));
    for node in extra {
        doc = doc.with_node(node);
    }
    doc
}

#[test]
fn test_slot_falls_back_to_default_children() {
    let doc = panel_document(Node::instance("p", "panel"), vec![]);
    let scene = build_scene(&doc, "f1").unwrap();

    let slot = scene.node("p::panel_actions").unwrap();
    assert_eq!(slot.slot_key.as_deref(), Some("actions"));
    assert_eq!(slot.source_type, NodeType::Slot);
    assert!(matches!(slot.props, ExpandedProps::Container(_)));
    assert_eq!(slot.child_ids, vec!["p::panel_default".to_string()]);
}

#[test]
fn test_slot_uses_instance_content_in_authoring_scope() {
    let instance = Node::instance("p", "panel").with_slot_content("actions", ["save", "cancel"]);
    let doc = panel_document(
        instance,
        vec![Node::text("save", "Save"), Node::text("cancel", "Cancel")],
    );
    let scene = build_scene(&doc, "f1").unwrap();

    let slot = scene.node("p::panel_actions").unwrap();
    assert_eq!(slot.child_ids, vec!["save".to_string(), "cancel".to_string()]);

    // Content authored in the document stays editable
    let save = scene.node("save").unwrap();
    assert_eq!(save.patch_target.as_deref(), Some("save"));
    assert_eq!(save.parent.as_deref(), Some("p::panel_actions"));
    assert!(scene.node("p::panel_default").is_none());
}

#[test]
fn test_slot_content_is_not_rendered_as_direct_instance_child() {
    let instance = Node::instance("p", "panel").with_slot_content("actions", ["save"]);
    let doc = panel_document(instance, vec![Node::text("save", "Save")]);
    let scene = build_scene(&doc, "f1").unwrap();

    assert_eq!(scene.node("p").unwrap().child_ids, vec!["p::panel_root".to_string()]);
}

#[test]
fn test_empty_slot_assignment_uses_default() {
    let instance = Node::instance("p", "panel").with_slot_content("actions", Vec::<String>::new());
    let doc = panel_document(instance, vec![]);
    let scene = build_scene(&doc, "f1").unwrap();

    assert_eq!(
        scene.node("p::panel_actions").unwrap().child_ids,
        vec!["p::panel_default".to_string()]
    );
}

#[test]
fn test_nested_instance_content_is_namespaced_by_outer_instance() {
    // `dialog` places a panel and fills its slot with its own node
    let doc = panel_document(Node::instance("d", "dialog"), vec![])
        .with_node(Node::container("dialog_root").with_children(["dialog_panel"]))
        .with_node(Node::instance("dialog_panel", "panel").with_slot_content("actions", ["dialog_ok"]))
        .with_node(Node::text("dialog_ok", "OK"))
        .with_component(ComponentDef::new("dialog", "dialog_root"));

    let scene = build_scene(&doc, "f1").unwrap();

    let slot = scene.node("d::dialog_panel::panel_actions").unwrap();
    assert_eq!(slot.child_ids, vec!["d::dialog_ok".to_string()]);
    let ok = scene.node("d::dialog_ok").unwrap();
    assert_eq!(ok.patch_target, None);
    assert_eq!(ok.parent.as_deref(), Some("d::dialog_panel::panel_actions"));
}
