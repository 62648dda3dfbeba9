//! Patch protocol behavior through the public applier API

use serde_json::json;
use vellum_common::DiagnosticCode;
use vellum_editor::{apply, apply_batch, invert, PatchOp, ValidationMode};
use vellum_model::{AutoLayout, EditorDocument, Frame, Node, Position, Rect, SizeMode};

fn document() -> EditorDocument {
    EditorDocument::new("doc")
        .with_node(
            Node::container("n_root")
                .with_auto_layout(AutoLayout::vertical())
                .with_children(["n_text", "n_child", "n_other"]),
        )
        .with_node(Node::text("n_text", "Hi"))
        .with_node(Node::container("n_child").with_position(Position::absolute(5.0, 5.0)))
        .with_node(
            Node::container("n_other")
                .with_size(SizeMode::fixed(200.0), SizeMode::fixed(100.0))
                .with_children(["n_leaf"]),
        )
        .with_node(Node::text("n_leaf", "leaf"))
        .with_frame(Frame::new("f1", "n_root", Rect::new(0.0, 0.0, 320.0, 640.0)))
}

#[test]
fn test_set_text_marks_node_and_auto_layout_ancestor() {
    let applied = apply_batch(
        &document(),
        &[PatchOp::set_prop("n_text", "/props/text", json!("Bye"))],
        ValidationMode::Strict,
    )
    .unwrap();

    assert!(applied.changes.compilation_dirty.contains("n_text"));
    assert!(applied.changes.compilation_dirty.contains("n_root"));
    assert!(applied.changes.geometry_dirty.is_empty());
    assert!(applied.changes.frame_dirty.is_empty());
}

#[test]
fn test_move_node_to_front_of_new_parent() {
    let doc = apply(&document(), &PatchOp::move_node("n_child", "n_other", Some(0))).unwrap();

    let root = doc.node("n_root").unwrap();
    assert!(!root.child_ids.contains(&"n_child".to_string()));
    assert_eq!(doc.node("n_other").unwrap().child_ids[0], "n_child");
}

#[test]
fn test_insert_attach_detach_delete_restores_node_map() {
    let before = document();
    let ops = [
        PatchOp::insert_node(Node::text("n_new", "new")),
        PatchOp::attach("n_root", "n_new", Some(1)),
        PatchOp::detach("n_root", "n_new"),
        PatchOp::delete("n_new"),
    ];
    let after = apply_batch(&before, &ops, ValidationMode::Strict).unwrap().document;

    assert!(!after.contains_node("n_new"));
    assert_eq!(after.node("n_root").unwrap().child_ids, before.node("n_root").unwrap().child_ids);
    assert_eq!(after, before);
}

#[test]
fn test_inverse_round_trip_for_mixed_batches() {
    let batches: Vec<Vec<PatchOp>> = vec![
        vec![PatchOp::set_prop("n_child", "/layout/position/x", json!(40.0))],
        vec![PatchOp::set_prop("n_text", "/style/fill", json!("#ff0000"))],
        vec![PatchOp::set_prop("n_root", "/layout/autoLayout", json!(null))],
        vec![PatchOp::detach("n_other", "n_leaf"), PatchOp::delete("n_leaf")],
        vec![PatchOp::detach("n_root", "n_other"), PatchOp::delete("n_other")],
        vec![
            PatchOp::move_node("n_text", "n_other", None),
            PatchOp::set_prop("n_text", "/name", json!("Moved")),
            PatchOp::move_node("n_leaf", "n_root", Some(0)),
        ],
        vec![PatchOp::replace(
            Node::container("n_other").with_children(["n_leaf", "n_extra"]),
        ), PatchOp::insert_node(Node::spacer("n_extra"))],
        vec![PatchOp::set_frame_prop("f1", "/name", json!("Home"))],
        vec![
            PatchOp::insert_node(Node::container("c_root")),
            PatchOp::InsertComponent {
                component: vellum_model::ComponentDef::new("card", "c_root"),
            },
            PatchOp::insert_node(Node::instance("n_inst", "card")),
            PatchOp::attach("n_root", "n_inst", None),
        ],
    ];

    for ops in batches {
        let doc = document();
        let applied = apply_batch(&doc, &ops, ValidationMode::Strict)
            .unwrap_or_else(|err| panic!("batch {:?} failed: {}", ops, err));
        let inverse = invert(&doc, &ops).unwrap();
        assert_eq!(inverse, applied.inverse);

        let restored = apply_batch(&applied.document, &inverse, ValidationMode::Strict).unwrap();
        assert_eq!(restored.document, doc, "round trip failed for {:?}", ops);
    }
}

#[test]
fn test_position_only_change_is_geometry() {
    let applied = apply_batch(
        &document(),
        &[PatchOp::set_prop("n_child", "/layout/position/y", json!(99.0))],
        ValidationMode::Strict,
    )
    .unwrap();
    assert_eq!(applied.changes.geometry_dirty.len(), 1);
    assert!(applied.changes.geometry_dirty.contains("n_child"));
    assert!(applied.changes.compilation_dirty.is_empty());
}

#[test]
fn test_position_mode_change_is_compilation() {
    let applied = apply_batch(
        &document(),
        &[PatchOp::set_prop("n_text", "/layout/position", json!({"mode": "absolute", "x": 1, "y": 2}))],
        ValidationMode::Strict,
    )
    .unwrap();
    assert!(applied.changes.compilation_dirty.contains("n_text"));
    assert!(applied.changes.compilation_dirty.contains("n_root"));
}

#[test]
fn test_frame_resize_vs_move() {
    let moved = apply_batch(
        &document(),
        &[PatchOp::set_frame_prop("f1", "/placement/x", json!(500.0))],
        ValidationMode::Strict,
    )
    .unwrap();
    assert!(moved.changes.frame_dirty.contains("f1"));
    assert!(moved.changes.compilation_dirty.is_empty());

    let resized = apply_batch(
        &document(),
        &[PatchOp::set_frame_prop("f1", "/placement/width", json!(500.0))],
        ValidationMode::Strict,
    )
    .unwrap();
    assert!(resized.changes.compilation_dirty.contains("n_root"));
}

#[test]
fn test_property_errors_reject_batch() {
    let cases = [
        (PatchOp::set_prop("n_text", "props/text", json!("x")), DiagnosticCode::InvalidPath),
        (PatchOp::set_prop("n_text", "/props/nope", json!("x")), DiagnosticCode::UnknownPath),
        (PatchOp::set_prop("n_text", "/style/fill", json!("red")), DiagnosticCode::TypeMismatch),
        (PatchOp::set_prop("n_text", "/style/opacity", json!(2.0)), DiagnosticCode::OutOfRange),
        (PatchOp::set_prop("n_text", "/layout/position/x", json!(1.0)), DiagnosticCode::UnknownPath),
    ];
    for (op, code) in cases {
        for mode in [ValidationMode::Strict, ValidationMode::Lenient] {
            let err = apply_batch(&document(), std::slice::from_ref(&op), mode).unwrap_err();
            assert_eq!(err.code(), code, "{:?} in {:?}", op, mode);
        }
    }
}

#[test]
fn test_strict_and_lenient_unknown_targets() {
    let ops = [
        PatchOp::attach("ghost_parent", "n_text", None),
        PatchOp::set_frame_prop("ghost_frame", "/name", json!("x")),
        PatchOp::move_node("ghost", "n_root", None),
        PatchOp::set_prop("n_text", "/props/text", json!("kept")),
    ];

    let err = apply_batch(&document(), &ops, ValidationMode::Strict).unwrap_err();
    assert_eq!(err.op_index(), Some(0));
    assert_eq!(err.code(), DiagnosticCode::NodeNotFound);

    let applied = apply_batch(&document(), &ops, ValidationMode::Lenient).unwrap();
    assert_eq!(applied.skipped.len(), 3);
    assert_eq!(applied.applied.len(), 1);
    assert_eq!(applied.skipped[1].code, DiagnosticCode::FrameNotFound);
}

#[test]
fn test_delete_style_unknown_targets_are_noops_in_strict_mode() {
    let ops = [
        PatchOp::detach("ghost", "n_text"),
        PatchOp::detach("n_root", "n_leaf"),
        PatchOp::delete("ghost"),
        PatchOp::replace(Node::text("ghost", "x")),
        PatchOp::RemoveFrame {
            frame_id: "ghost".to_string(),
        },
        PatchOp::RemoveComponent {
            component_id: "ghost".to_string(),
        },
    ];
    let applied = apply_batch(&document(), &ops, ValidationMode::Strict).unwrap();
    assert_eq!(applied.document, document());
    assert!(applied.inverse.is_empty());
    assert!(applied.changes.is_empty());
}

#[test]
fn test_duplicate_ids_rejected() {
    let err = apply(&document(), &PatchOp::insert_node(Node::text("n_text", "dup"))).unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::DuplicateId);

    let err = apply(
        &document(),
        &PatchOp::InsertFrame {
            frame: Frame::new("f1", "n_leaf", Rect::new(0.0, 0.0, 1.0, 1.0)),
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::DuplicateId);
}

#[test]
fn test_delete_removes_whole_subtree() {
    let ops = [PatchOp::detach("n_root", "n_other"), PatchOp::delete("n_other")];
    let doc = apply_batch(&document(), &ops, ValidationMode::Strict).unwrap().document;
    assert!(!doc.contains_node("n_other"));
    assert!(!doc.contains_node("n_leaf"));
}

#[test]
fn test_ops_from_json_apply() {
    let json = r#"[
        {"op": "insertNode", "node": {"id": "n_btn", "props": {"type": "text", "text": "Go"}}},
        {"op": "attachChild", "parentId": "n_root", "childId": "n_btn", "index": 0},
        {"op": "setProp", "nodeId": "n_btn", "path": "/style/fill", "value": {"token": "color.primary"}}
    ]"#;
    let ops = PatchOp::batch_from_json(json).unwrap();
    let doc = apply_batch(&document(), &ops, ValidationMode::Strict).unwrap().document;
    assert_eq!(doc.node("n_root").unwrap().child_ids[0], "n_btn");
    assert!(doc.node("n_btn").unwrap().style.fill.is_some());
}
