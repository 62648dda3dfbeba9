//! Turning a clipboard payload into a patch batch

use crate::errors::EditorError;
use crate::patch::PatchOp;
use std::collections::HashSet;
use vellum_model::{ClipboardPayload, EditorDocument, IdGenerator, Node, NodeId, NumberValue, Point, Position};

/// Batch that inserts a fresh-id copy of `payload` under `parent_id`.
///
/// Roots are attached in payload order starting at `index` (appended when
/// `None`). Absolutely positioned roots keep their offset from the payload's
/// anchor, moved to `offset`.
pub fn paste_patches(
    document: &EditorDocument,
    payload: &ClipboardPayload,
    parent_id: &str,
    index: Option<usize>,
    offset: Point,
    ids: &mut IdGenerator,
) -> Result<Vec<PatchOp>, EditorError> {
    if !document.contains_node(parent_id) {
        return Err(EditorError::NodeNotFound(parent_id.to_string()));
    }

    let mut payload = payload.clone();
    payload.remap_ids(ids, |id| document.contains_node(id));

    let mut ops = Vec::with_capacity(payload.nodes.len() + payload.root_ids.len());
    for (position, root_id) in payload.root_ids.iter().enumerate() {
        for id in leaves_first(&payload, root_id) {
            let Some(node) = payload.nodes.get(&id) else {
                continue;
            };
            let mut node = node.clone();
            if &id == root_id {
                shift(&mut node, payload.anchor, offset);
            }
            ops.push(PatchOp::insert_node(node));
        }
        ops.push(PatchOp::attach(parent_id, root_id, index.map(|start| start + position)));
    }
    Ok(ops)
}

/// Subtree ids with every node after all of its descendants
fn leaves_first(payload: &ClipboardPayload, root_id: &str) -> Vec<NodeId> {
    let mut order: Vec<NodeId> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if let Some(node) = payload.nodes.get(id) {
            stack.extend(node.child_ids.iter().map(String::as_str));
        }
        order.push(id.to_string());
    }
    order.reverse();
    order
}

fn shift(node: &mut Node, anchor: Point, offset: Point) {
    if let Position::Absolute { x, y } = &mut node.layout.position {
        if let NumberValue::Fixed(value) = x {
            *value = *value - anchor.x + offset.x;
        }
        if let NumberValue::Fixed(value) = y {
            *value = *value - anchor.y + offset.y;
        }
    }
}
