//! Document store history, queries and clipboard

use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use vellum_common::DiagnosticCode;
use vellum_editor::{DocumentStore, EditorError, HistoryOutcome, PatchOp, PatchOptions, StoreConfig};
use vellum_model::{AutoLayout, EditorDocument, Frame, Node, NodeProps, Point, Position, Rect};

fn document() -> EditorDocument {
    EditorDocument::new("doc")
        .with_node(
            Node::container("n_root")
                .with_auto_layout(AutoLayout::vertical())
                .with_children(["n_text", "n_group"]),
        )
        .with_node(Node::text("n_text", "Hi"))
        .with_node(Node::container("n_group").with_children(["n_box"]))
        .with_node(Node::container("n_box").with_position(Position::absolute(0.0, 0.0)))
        .with_frame(Frame::new("f1", "n_root", Rect::new(0.0, 0.0, 320.0, 640.0)))
}

fn text_of(store: &DocumentStore, id: &str) -> String {
    match store.document().node(id).map(|node| &node.props) {
        Some(NodeProps::Text(props)) => props.text.clone(),
        other => panic!("expected text node, got {:?}", other),
    }
}

fn set_text(text: &str) -> PatchOp {
    PatchOp::set_prop("n_text", "/props/text", json!(text))
}

#[test]
fn test_apply_undo_redo() {
    let mut store = DocumentStore::new(document());
    let original = store.document().clone();

    let update = store.apply_patch(set_text("Bye")).unwrap();
    assert_eq!(update.version, 1);
    assert!(update.changes.compilation_dirty.contains("n_root"));
    assert_eq!(text_of(&store, "n_text"), "Bye");

    let undone = store.undo().unwrap().into_update().unwrap();
    assert_eq!(*undone.document, *original);
    assert!(undone.changes.compilation_dirty.contains("n_text"));
    assert!(store.can_redo());

    store.redo().unwrap();
    assert_eq!(text_of(&store, "n_text"), "Bye");
    assert_eq!(store.version(), 3);
}

#[test]
fn test_documents_are_immutable_snapshots() {
    let mut store = DocumentStore::new(document());
    let before = store.document().clone();
    store.apply_patch(set_text("Bye")).unwrap();

    assert!(!Arc::ptr_eq(&before, store.document()));
    match &before.node("n_text").unwrap().props {
        NodeProps::Text(props) => assert_eq!(props.text, "Hi"),
        other => panic!("unexpected props {:?}", other),
    }
    // Untouched nodes are shared between versions
    assert!(Arc::ptr_eq(&before.nodes["n_box"], &store.document().nodes["n_box"]));
}

#[test]
fn test_empty_history_is_explicit() {
    let mut store = DocumentStore::new(document());
    assert!(matches!(store.undo().unwrap(), HistoryOutcome::Empty));
    assert!(matches!(store.redo().unwrap(), HistoryOutcome::Empty));
    assert_eq!(store.version(), 0);
}

#[test]
fn test_rejected_batch_changes_nothing() {
    let mut store = DocumentStore::new(document());
    let before = store.document().clone();

    let err = store
        .apply_patches(&[set_text("Bye"), PatchOp::delete("n_text")])
        .unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::DeleteBeforeDetach);
    assert!(matches!(err, EditorError::Batch(_)));
    assert!(Arc::ptr_eq(&before, store.document()));
    assert_eq!(store.version(), 0);
    assert!(!store.can_undo());
}

#[test]
fn test_new_batch_clears_redo() {
    let mut store = DocumentStore::new(document());
    store.apply_patch(set_text("a")).unwrap();
    store.undo().unwrap();
    assert_eq!(store.redo_levels(), 1);

    store.apply_patch(set_text("b")).unwrap();
    assert_eq!(store.redo_levels(), 0);
    assert!(!store.can_redo());
}

#[test]
fn test_history_keeps_last_hundred_entries() {
    let mut store = DocumentStore::new(document());
    for i in 0..105 {
        store.apply_patch(set_text(&format!("t{}", i))).unwrap();
    }
    assert_eq!(store.undo_levels(), 100);

    while store.undo().unwrap().is_applied() {}
    // The five oldest edits can no longer be undone
    assert_eq!(text_of(&store, "n_text"), "t4");
}

#[test]
fn test_grouped_batches_coalesce_within_window() {
    let mut store = DocumentStore::new(document());
    let start = Instant::now();

    for (i, x) in [10.0, 20.0, 30.0].iter().enumerate() {
        let options = PatchOptions::grouped("drag").at(start + Duration::from_millis(300 * i as u64));
        store
            .apply_patches_with(&[PatchOp::set_prop("n_box", "/layout/position/x", json!(x))], options)
            .unwrap();
    }
    assert_eq!(store.undo_levels(), 1);

    let late = PatchOptions::grouped("drag").at(start + Duration::from_secs(10));
    store
        .apply_patches_with(&[PatchOp::set_prop("n_box", "/layout/position/x", json!(99.0))], late)
        .unwrap();
    assert_eq!(store.undo_levels(), 2);

    store.undo().unwrap();
    store.undo().unwrap();
    assert_eq!(
        store.document().node("n_box").unwrap().layout.position,
        Position::absolute(0.0, 0.0)
    );
}

#[test]
fn test_coalescing_respects_configured_window() {
    let config: StoreConfig = serde_json::from_str(r#"{"coalesceWindowMs": 100}"#).unwrap();
    let mut store = DocumentStore::with_config(document(), config);
    let start = Instant::now();

    store
        .apply_patches_with(&[set_text("a")], PatchOptions::grouped("typing").at(start))
        .unwrap();
    store
        .apply_patches_with(
            &[set_text("ab")],
            PatchOptions::grouped("typing").at(start + Duration::from_millis(500)),
        )
        .unwrap();
    assert_eq!(store.undo_levels(), 2);
}

#[test]
fn test_descriptions() {
    let mut store = DocumentStore::new(document());
    store
        .apply_patches_with(&[set_text("x")], PatchOptions::described("Edit text"))
        .unwrap();
    assert_eq!(store.undo_description(), Some("Edit text"));
    store.undo().unwrap();
    assert_eq!(store.redo_description(), Some("Edit text"));
    store.clear_history();
    assert!(!store.can_redo());
}

#[test]
fn test_lenient_store_reports_skips() {
    let mut store = DocumentStore::with_config(document(), StoreConfig::default().lenient());
    let update = store
        .apply_patches(&[PatchOp::set_prop("ghost", "/name", json!("x")), set_text("ok")])
        .unwrap();
    assert_eq!(update.skipped.len(), 1);
    assert_eq!(text_of(&store, "n_text"), "ok");

    // Nothing left to apply: no history entry, no version bump
    let update = store.apply_patches(&[PatchOp::set_prop("ghost", "/name", json!("x"))]).unwrap();
    assert_eq!(update.skipped.len(), 1);
    assert_eq!(store.version(), 1);
    assert_eq!(store.undo_levels(), 1);
}

#[test]
fn test_parent_queries_follow_edits() {
    let mut store = DocumentStore::new(document());
    assert_eq!(store.get_parent("n_box"), Some("n_group"));
    assert_eq!(store.get_ancestors("n_box"), vec!["n_group".to_string(), "n_root".to_string()]);
    assert_eq!(store.get_descendants("n_root"), vec!["n_text", "n_group", "n_box"]);
    assert_eq!(store.get_frame_for_node("n_box").map(|f| f.id.as_str()), Some("f1"));

    store
        .apply_patch(PatchOp::move_node("n_box", "n_root", Some(0)))
        .unwrap();
    assert_eq!(store.get_parent("n_box"), Some("n_root"));
    assert_eq!(store.get_descendants("n_group"), Vec::<String>::new());

    store
        .apply_patches(&[PatchOp::detach("n_root", "n_box")])
        .unwrap();
    assert_eq!(store.get_parent("n_box"), None);
    assert!(store.get_frame_for_node("n_box").is_none());
}

#[test]
fn test_copy_paste_round() {
    let mut store = DocumentStore::new(document());
    let payload = store.copy(&["n_group".to_string()], Point::new(0.0, 0.0)).unwrap();

    let update = store.paste(&payload, "n_root", Some(0), Point::new(20.0, 20.0)).unwrap();
    let root = update.document.node("n_root").unwrap();
    assert_eq!(root.child_ids.len(), 3);
    let pasted_id = root.child_ids[0].clone();
    assert_ne!(pasted_id, "n_group");
    assert_eq!(store.get_descendants(&pasted_id).len(), 1);
    assert_eq!(store.undo_description(), Some("Paste"));

    store.undo().unwrap();
    assert!(!store.document().contains_node(&pasted_id));

    let err = store.copy(&["ghost".to_string()], Point::default()).unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::NodeNotFound);
}
