//! Axis sizing rules: fill-axis boundedness and the sizing signature used to
//! decide when a recompile must cascade to descendants.

use vellum_model::{Axis, Layout, SizeMode};
use vellum_scene::{ExpandedNode, ExpandedScene};

/// Whether some ancestor of `node` bounds `axis`, making a fill request on
/// that axis meaningful.
///
/// Walking up: a fixed ancestor bounds the axis, a fill ancestor defers to its
/// own parent, a hug ancestor is unbounded unless its parent's auto-layout
/// stretches it along `axis`. The frame bounds the root.
pub fn fill_is_bounded(scene: &ExpandedScene, node: &ExpandedNode, axis: Axis) -> bool {
    let mut current = match node.parent.as_deref() {
        Some(parent) => parent,
        None => return true,
    };

    // Parent links come from a tree, the step limit only guards corrupted input
    for _ in 0..=scene.len() {
        let Some(ancestor) = scene.node(current) else {
            return false;
        };
        match ancestor.layout.size(axis) {
            SizeMode::Fixed { .. } => return true,
            SizeMode::Fill => match ancestor.parent.as_deref() {
                Some(parent) => current = parent,
                None => return true,
            },
            SizeMode::Hug => {
                let stretched_by = ancestor
                    .parent
                    .as_deref()
                    .and_then(|parent| scene.node(parent))
                    .filter(|parent| stretches(&parent.layout, axis));
                match stretched_by {
                    Some(parent) => current = &parent.id,
                    None => return false,
                }
            }
        }
    }
    false
}

fn stretches(layout: &Layout, axis: Axis) -> bool {
    layout
        .auto_layout
        .as_ref()
        .map(|auto| auto.stretches(axis))
        .unwrap_or(false)
}

/// The parts of a node's layout its descendants' compilation depends on
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SizingSignature {
    width: SizeMode,
    height: SizeMode,
    stretch: [bool; 2],
}

impl SizingSignature {
    pub(crate) fn of(layout: &Layout) -> Self {
        Self {
            width: layout.width.clone(),
            height: layout.height.clone(),
            stretch: [
                stretches(layout, Axis::Horizontal),
                stretches(layout, Axis::Vertical),
            ],
        }
    }
}
