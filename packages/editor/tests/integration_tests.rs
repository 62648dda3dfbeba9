//! Patch → expand → compile through the pipeline

use serde_json::json;
use std::sync::Arc;
use vellum_common::DiagnosticCode;
use vellum_editor::{DocumentStore, PatchOp, Pipeline};
use vellum_model::*;
use vellum_render::{compile_scene, RenderDocument, RenderValue};
use vellum_scene::build_scene;
use vellum_tokens::TokenResolver;

fn document() -> EditorDocument {
    let mut doc = EditorDocument::new("doc")
        .with_node(
            Node::container("n_root")
                .with_auto_layout(AutoLayout::vertical())
                .with_style(Style::default().with_fill(ColorValue::token("color.primary")))
                .with_children(["n_text", "a", "b"]),
        )
        .with_node(Node::text("n_text", "Hi"))
        .with_node(Node::instance("a", "card").with_override("title", json!("First")))
        .with_node(
            Node::instance("b", "card")
                .with_override("title", json!("Second"))
                .with_override("/card_body/props/text", json!("Other body")),
        )
        .with_frame(Frame::new("f1", "n_root", Rect::new(0.0, 0.0, 320.0, 480.0)))
        .with_component(ComponentDef::new("card", "card_root").with_param(
            "title",
            ParamType::String,
            json!("Untitled"),
            "card_title",
            "/props/text",
        ));
    for node in [
        Node::container("card_root").with_children(["card_title", "card_body"]),
        Node::text("card_title", "Title"),
        Node::text("card_body", "Body"),
    ] {
        doc = doc.with_node(node);
    }
    doc
}

fn tokens() -> TokenResolver {
    TokenResolver::from_json(r##"{"color": {"primary": "#3366FF"}}"##).unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(DocumentStore::new(document()), tokens())
}

fn text(render: &RenderDocument, id: &str) -> String {
    render
        .node(id)
        .and_then(|node| node.prop("text"))
        .and_then(RenderValue::as_str)
        .unwrap_or_else(|| panic!("no text on {}", id))
        .to_string()
}

fn same(a: &RenderDocument, b: &RenderDocument, id: &str) -> bool {
    Arc::ptr_eq(a.node(id).unwrap(), b.node(id).unwrap())
}

#[test]
fn test_render_expands_instances() {
    let mut pipeline = pipeline();
    let render = pipeline.render("f1").unwrap();

    assert_eq!(render.root_id, "n_root");
    assert_eq!(text(&render, "n_text"), "Hi");
    assert_eq!(text(&render, "a::card_title"), "First");
    assert_eq!(text(&render, "b::card_title"), "Second");
    assert_eq!(text(&render, "a::card_body"), "Body");
    assert_eq!(text(&render, "b::card_body"), "Other body");
    assert_eq!(
        render.root().unwrap().prop("fill").and_then(RenderValue::as_str),
        Some("#3366ff")
    );
    assert!(render.diagnostics.is_empty());
    assert_eq!(pipeline.cached_nodes("f1"), render.len());
}

#[test]
fn test_text_edit_reuses_untouched_nodes() {
    let mut pipeline = pipeline();
    let first = pipeline.render("f1").unwrap();

    pipeline
        .apply(&[PatchOp::set_prop("n_text", "/props/text", json!("Bye"))])
        .unwrap();
    let second = pipeline.render("f1").unwrap();

    assert_eq!(text(&second, "n_text"), "Bye");
    assert!(!same(&first, &second, "n_text"));
    for id in ["a", "a::card_title", "b::card_body"] {
        assert!(same(&first, &second, id), "{} was recompiled", id);
    }
}

#[test]
fn test_override_edit_recompiles_that_instance_only() {
    let mut pipeline = pipeline();
    let first = pipeline.render("f1").unwrap();

    pipeline
        .apply(&[PatchOp::set_prop("a", "/props/overrides/title", json!("Renamed"))])
        .unwrap();
    let second = pipeline.render("f1").unwrap();

    assert_eq!(text(&second, "a::card_title"), "Renamed");
    assert!(same(&first, &second, "b::card_title"));
    assert!(same(&first, &second, "n_text"));
}

#[test]
fn test_component_edit_reaches_every_instance() {
    let mut pipeline = pipeline();
    pipeline.render("f1").unwrap();

    pipeline
        .apply(&[PatchOp::set_prop("card_body", "/props/text", json!("New body"))])
        .unwrap();
    let render = pipeline.render("f1").unwrap();

    assert_eq!(text(&render, "a::card_body"), "New body");
    // The override still wins on b
    assert_eq!(text(&render, "b::card_body"), "Other body");
}

#[test]
fn test_structural_edit_and_undo() {
    let mut pipeline = pipeline();
    let first = pipeline.render("f1").unwrap();

    pipeline
        .apply(&[
            PatchOp::insert_node(Node::text("n_new", "Added")),
            PatchOp::attach("n_root", "n_new", Some(0)),
        ])
        .unwrap();
    let second = pipeline.render("f1").unwrap();
    assert_eq!(second.len(), first.len() + 1);
    assert_eq!(second.root().unwrap().child_ids[0], "n_new");

    assert!(pipeline.undo().unwrap().is_applied());
    let third = pipeline.render("f1").unwrap();
    assert_eq!(third.len(), first.len());
    assert!(third.node("n_new").is_none());
    assert_eq!(pipeline.cached_nodes("f1"), first.len());

    assert!(pipeline.redo().unwrap().is_applied());
    assert!(pipeline.render("f1").unwrap().node("n_new").is_some());
}

#[test]
fn test_token_swap_recompiles() {
    let mut pipeline = pipeline();
    let first = pipeline.render("f1").unwrap();

    pipeline.set_tokens(TokenResolver::from_json(r##"{"color": {"primary": "#000"}}"##).unwrap());
    let second = pipeline.render("f1").unwrap();
    assert_eq!(
        second.root().unwrap().prop("fill").and_then(RenderValue::as_str),
        Some("#000000")
    );
    assert!(!same(&first, &second, "n_text"));

    pipeline.set_tokens(TokenResolver::empty());
    let third = pipeline.render("f1").unwrap();
    assert!(third.root().unwrap().prop("fill").is_none());
    assert!(third
        .diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::UnresolvedToken));
}

#[test]
fn test_removed_frame_drops_its_cache() {
    let mut pipeline = pipeline();
    pipeline.render("f1").unwrap();
    assert!(pipeline.cached_nodes("f1") > 0);

    pipeline
        .apply(&[PatchOp::RemoveFrame {
            frame_id: "f1".to_string(),
        }])
        .unwrap();
    assert_eq!(pipeline.cached_nodes("f1"), 0);

    let err = pipeline.render("f1").unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::FrameNotFound);

    pipeline.undo().unwrap();
    assert_eq!(text(&pipeline.render("f1").unwrap(), "n_text"), "Hi");
}

#[test]
fn test_rejected_batch_leaves_render_untouched() {
    let mut pipeline = pipeline();
    let first = pipeline.render("f1").unwrap();

    assert!(pipeline
        .apply(&[
            PatchOp::set_prop("n_text", "/props/text", json!("Bye")),
            PatchOp::set_prop("ghost", "/name", json!("x")),
        ])
        .is_err());
    let second = pipeline.render("f1").unwrap();
    assert_eq!(text(&second, "n_text"), "Hi");
    assert!(same(&first, &second, "n_text"));
}

#[test]
fn test_clear_cache() {
    let mut pipeline = pipeline();
    pipeline.render("f1").unwrap();
    pipeline.clear_cache();
    assert_eq!(pipeline.cached_nodes("f1"), 0);
    assert_eq!(text(&pipeline.render("f1").unwrap(), "a::card_title"), "First");
}

fn sizing_document() -> EditorDocument {
    let mut doc = EditorDocument::new("doc")
        .with_node(
            Node::container("root")
                .with_size(SizeMode::fixed(300.0), SizeMode::fixed(600.0))
                .with_children(["c", "h", "a"]),
        )
        .with_node(
            Node::container("c")
                .with_size(SizeMode::Fill, SizeMode::Hug)
                .with_children(["d"]),
        )
        .with_node(Node::container("d").with_size(SizeMode::Fill, SizeMode::Hug))
        .with_node(Node::container("h"))
        .with_node(Node::instance("a", "card").with_override("title", json!("First")))
        .with_frame(Frame::new("f1", "root", Rect::new(0.0, 0.0, 300.0, 600.0)))
        .with_component(ComponentDef::new("card", "card_root").with_param(
            "title",
            ParamType::String,
            json!("Untitled"),
            "card_title",
            "/props/text",
        ));
    for node in [
        Node::container("card_root")
            .with_size(SizeMode::Fill, SizeMode::Hug)
            .with_children(["card_title"]),
        Node::text("card_title", "Title"),
    ] {
        doc = doc.with_node(node);
    }
    doc
}

/// The cached render must equal a compile of the same document from scratch
fn assert_matches_full_compile(pipeline: &mut Pipeline, step: &str) {
    let incremental = pipeline.render("f1").unwrap();
    let scene = build_scene(pipeline.store().document(), "f1").unwrap();
    let full = compile_scene(&scene, pipeline.tokens());
    assert_eq!(incremental, full, "incremental render is stale after {}", step);
}

#[test]
fn test_incremental_render_matches_full_compile() {
    let mut pipeline = Pipeline::new(DocumentStore::new(sizing_document()), tokens());
    assert_matches_full_compile(&mut pipeline, "first render");

    let edits: Vec<(&str, Vec<PatchOp>)> = vec![
        ("move into a hugging parent", vec![PatchOp::move_node("c", "h", None)]),
        (
            "attach a filling child",
            vec![
                PatchOp::insert_node(Node::container("n_new").with_size(SizeMode::Fill, SizeMode::Hug)),
                PatchOp::attach("d", "n_new", None),
            ],
        ),
        (
            "fix the ancestor width",
            vec![PatchOp::set_prop("h", "/layout/width", json!({"mode": "fixed", "value": 120.0}))],
        ),
        (
            "move the instance under the fill chain",
            vec![PatchOp::move_node("a", "n_new", Some(0))],
        ),
        (
            "override edit",
            vec![PatchOp::set_prop("a", "/props/overrides/title", json!("Renamed"))],
        ),
        (
            "component root resize",
            vec![PatchOp::set_prop("card_root", "/layout/width", json!({"mode": "hug"}))],
        ),
    ];

    for (step, ops) in &edits {
        pipeline.apply(ops).unwrap();
        assert_matches_full_compile(&mut pipeline, step);
    }

    for (step, _) in edits.iter().rev() {
        assert!(pipeline.undo().unwrap().is_applied());
        assert_matches_full_compile(&mut pipeline, &format!("undo of {}", step));
    }
    assert_eq!(**pipeline.store().document(), sizing_document());

    for (step, _) in &edits {
        assert!(pipeline.redo().unwrap().is_applied());
        assert_matches_full_compile(&mut pipeline, &format!("redo of {}", step));
    }

    pipeline
        .apply(&[PatchOp::detach("d", "n_new"), PatchOp::delete("n_new")])
        .unwrap();
    assert_matches_full_compile(&mut pipeline, "subtree delete");
}
