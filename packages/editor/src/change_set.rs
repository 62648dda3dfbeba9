//! Which expanded-scene work a batch invalidates.
//!
//! The applier records raw effects per op; [`ChangeRecorder::finish`] turns
//! them into a [`SceneChangeSet`] against the post-batch document.

use crate::parent_index::ParentIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use vellum_model::{EditorDocument, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneChangeSet {
    /// Nodes whose position moved but whose compiled output is otherwise intact
    pub geometry_dirty: BTreeSet<NodeId>,
    /// Nodes that need recompilation
    pub compilation_dirty: BTreeSet<NodeId>,
    /// Frames that were inserted, removed, moved or resized
    pub frame_dirty: BTreeSet<String>,
}

impl SceneChangeSet {
    pub fn is_empty(&self) -> bool {
        self.geometry_dirty.is_empty() && self.compilation_dirty.is_empty() && self.frame_dirty.is_empty()
    }

    /// Every node id in either dirty set
    pub fn dirty_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.compilation_dirty.iter().chain(self.geometry_dirty.iter())
    }
}

#[derive(Debug, Default)]
pub(crate) struct ChangeRecorder {
    geometry: BTreeSet<NodeId>,
    paint: BTreeSet<NodeId>,
    layout: BTreeSet<NodeId>,
    components: BTreeSet<String>,
    frames: BTreeSet<String>,
    resized_frames: BTreeSet<String>,
}

impl ChangeRecorder {
    /// Position moved, nothing else
    pub fn geometry(&mut self, id: &str) {
        self.geometry.insert(id.to_string());
    }

    /// Output changed, sizes did not
    pub fn paint(&mut self, id: &str) {
        self.paint.insert(id.to_string());
    }

    /// Size or flow may have changed
    pub fn layout(&mut self, id: &str) {
        self.layout.insert(id.to_string());
    }

    /// Component definition inserted or removed
    pub fn component(&mut self, id: &str) {
        self.components.insert(id.to_string());
    }

    pub fn frame(&mut self, id: &str, resized: bool) {
        self.frames.insert(id.to_string());
        if resized {
            self.resized_frames.insert(id.to_string());
        }
    }

    pub fn finish(self, document: &EditorDocument, parents: &ParentIndex) -> SceneChangeSet {
        let mut changes = SceneChangeSet {
            frame_dirty: self.frames,
            ..SceneChangeSet::default()
        };

        let mut layout = self.layout;
        for frame_id in &self.resized_frames {
            if let Some(frame) = document.frame(frame_id) {
                layout.insert(frame.root_node_id.clone());
            }
        }

        let mut pending_components: Vec<String> = self.components.into_iter().collect();
        for id in &layout {
            if let Some(component_id) = owning_component(document, parents, id) {
                pending_components.push(component_id);
            }
        }

        // Instances of an edited component lay out again, and so may the
        // components those instances live in.
        let mut visited: BTreeSet<String> = BTreeSet::new();
        while let Some(component_id) = pending_components.pop() {
            if !visited.insert(component_id.clone()) {
                continue;
            }
            let instances: Vec<NodeId> = document.instances_of(&component_id).map(str::to_string).collect();
            for instance_id in instances {
                if let Some(owner) = owning_component(document, parents, &instance_id) {
                    pending_components.push(owner);
                }
                layout.insert(instance_id);
            }
        }

        for id in &layout {
            propagate(document, parents, id, &mut changes.compilation_dirty);
        }
        changes.compilation_dirty.extend(self.paint);
        changes.geometry_dirty = self.geometry;

        changes.compilation_dirty.retain(|id| document.contains_node(id));
        changes.geometry_dirty.retain(|id| document.contains_node(id));
        let compiled = &changes.compilation_dirty;
        changes.geometry_dirty.retain(|id| !compiled.contains(id));
        changes
    }
}

/// Mark `id` and every ancestor whose layout depends on it
fn propagate(document: &EditorDocument, parents: &ParentIndex, id: &str, dirty: &mut BTreeSet<NodeId>) {
    dirty.insert(id.to_string());
    for parent_id in parents.ancestors(id) {
        let Some(parent) = document.node(&parent_id) else {
            break;
        };
        let hugs = parent.layout.hugs();
        if parent.layout.auto_layout.is_none() && !hugs {
            break;
        }
        dirty.insert(parent_id);
        if !hugs {
            break;
        }
    }
}

fn owning_component(document: &EditorDocument, parents: &ParentIndex, id: &str) -> Option<String> {
    document
        .component_with_root(&parents.top(id))
        .map(|component| component.id.clone())
}
