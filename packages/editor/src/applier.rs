//! Atomic batch application.
//!
//! A batch runs against a working copy of the document. Each op computes its
//! own inverse from the state it sees just before it runs; the batch inverse
//! is those inverses in reverse order. Entity-level integrity is checked once
//! the whole batch has run, so ops inside a batch may pass through transient
//! states (a parent listing a child that is inserted two ops later).

use crate::change_set::{ChangeRecorder, SceneChangeSet};
use crate::errors::{BatchError, PatchError};
use crate::parent_index::{subtree_ids, ParentIndex};
use crate::patch::{PatchOp, ValidationMode};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use vellum_common::{Diagnostic, DiagnosticLevel};
use vellum_model::path::{
    frame_path_is_placement_only, node_path_impact, set_frame_prop, set_node_prop, validate_node,
};
use vellum_model::{ComponentDef, EditorDocument, Frame, Node, NodeProps, PropPath, PropertyImpact};

/// Result of a batch that passed validation
#[derive(Debug, Clone)]
pub struct AppliedBatch {
    pub document: EditorDocument,
    pub parents: ParentIndex,
    /// Ops that took effect, in order. Lenient skips are left out.
    pub applied: Vec<PatchOp>,
    /// Restores the input document when applied to `document`
    pub inverse: Vec<PatchOp>,
    pub changes: SceneChangeSet,
    /// One warning per op skipped in lenient mode
    pub skipped: Vec<Diagnostic>,
}

/// Apply `ops` atomically. On error the input document is untouched.
pub fn apply_batch(
    document: &EditorDocument,
    ops: &[PatchOp],
    mode: ValidationMode,
) -> Result<AppliedBatch, BatchError> {
    let parents = ParentIndex::build(document);
    apply_batch_indexed(document, &parents, ops, mode)
}

/// Same as [`apply_batch`], reusing a parent index that matches `document`
#[instrument(skip_all, fields(ops = ops.len(), mode = ?mode))]
pub fn apply_batch_indexed(
    document: &EditorDocument,
    parents: &ParentIndex,
    ops: &[PatchOp],
    mode: ValidationMode,
) -> Result<AppliedBatch, BatchError> {
    let mut batch = Batch {
        document: document.clone(),
        parents: parents.clone(),
        mode,
        touched: Touched::default(),
        recorder: ChangeRecorder::default(),
    };
    let mut applied = Vec::with_capacity(ops.len());
    let mut inverses: Vec<Vec<PatchOp>> = Vec::with_capacity(ops.len());
    let mut skipped = Vec::new();

    for (index, op) in ops.iter().enumerate() {
        match batch.apply(op) {
            Ok(Step::Applied(inverse)) => {
                applied.push(op.clone());
                inverses.push(inverse);
            }
            Ok(Step::Skipped(error)) => {
                warn!(index, op = op.kind(), error = %error, "Skipping op with unknown target");
                let mut diagnostic = error.to_diagnostic();
                diagnostic.level = DiagnosticLevel::Warning;
                diagnostic.message = format!("Skipped {} (op #{}): {}", op.kind(), index, error);
                skipped.push(diagnostic);
            }
            Err(source) => {
                warn!(index, op = op.kind(), error = %source, "Rejecting batch");
                return Err(BatchError::Op {
                    index,
                    op: op.kind(),
                    source,
                });
            }
        }
    }

    batch.check_integrity().map_err(|error| {
        warn!(error = %error, "Batch failed integrity check");
        BatchError::Integrity(error)
    })?;

    let Batch {
        document,
        parents,
        recorder,
        ..
    } = batch;
    let changes = recorder.finish(&document, &parents);
    let inverse: Vec<PatchOp> = inverses.into_iter().rev().flatten().collect();

    debug!(
        applied = applied.len(),
        skipped = skipped.len(),
        compilation_dirty = changes.compilation_dirty.len(),
        geometry_dirty = changes.geometry_dirty.len(),
        "Batch applied"
    );

    Ok(AppliedBatch {
        document,
        parents,
        applied,
        inverse,
        changes,
        skipped,
    })
}

/// Apply a single op in strict mode
pub fn apply(document: &EditorDocument, op: &PatchOp) -> Result<EditorDocument, BatchError> {
    apply_batch(document, std::slice::from_ref(op), ValidationMode::Strict).map(|batch| batch.document)
}

/// The batch that undoes `ops` on `document`
pub fn invert(document: &EditorDocument, ops: &[PatchOp]) -> Result<Vec<PatchOp>, BatchError> {
    apply_batch(document, ops, ValidationMode::Strict).map(|batch| batch.inverse)
}

enum Step {
    Applied(Vec<PatchOp>),
    Skipped(PatchError),
}

#[derive(Default)]
struct Touched {
    nodes: BTreeSet<String>,
    frames: BTreeSet<String>,
    components: BTreeSet<String>,
    components_removed: bool,
}

struct Batch {
    document: EditorDocument,
    parents: ParentIndex,
    mode: ValidationMode,
    touched: Touched,
    recorder: ChangeRecorder,
}

impl Batch {
    fn apply(&mut self, op: &PatchOp) -> Result<Step, PatchError> {
        match op {
            PatchOp::SetProp { node_id, path, value } => self.set_prop(node_id, path, value),
            PatchOp::SetFrameProp { frame_id, path, value } => self.set_frame_prop(frame_id, path, value),
            PatchOp::InsertNode { node } => self.insert_node(node),
            PatchOp::AttachChild {
                parent_id,
                child_id,
                index,
            } => self.attach_child(parent_id, child_id, *index),
            PatchOp::DetachChild { parent_id, child_id } => Ok(self.detach_child(parent_id, child_id)),
            PatchOp::DeleteNode { node_id } => self.delete_node(node_id),
            PatchOp::MoveNode {
                node_id,
                new_parent_id,
                index,
            } => self.move_node(node_id, new_parent_id, *index),
            PatchOp::ReplaceNode { node_id, node } => self.replace_node(node_id, node),
            PatchOp::InsertFrame { frame } => self.insert_frame(frame),
            PatchOp::RemoveFrame { frame_id } => Ok(self.remove_frame(frame_id)),
            PatchOp::InsertComponent { component } => self.insert_component(component),
            PatchOp::RemoveComponent { component_id } => Ok(self.remove_component(component_id)),
        }
    }

    fn missing(&self, error: PatchError) -> Result<Step, PatchError> {
        match self.mode {
            ValidationMode::Strict => Err(error),
            ValidationMode::Lenient => Ok(Step::Skipped(error)),
        }
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, PatchError> {
        self.document
            .nodes
            .get_mut(id)
            .map(Arc::make_mut)
            .ok_or_else(|| PatchError::NodeNotFound(id.to_string()))
    }

    fn is_root(&self, id: &str) -> bool {
        self.document.frame_with_root(id).is_some() || self.document.component_with_root(id).is_some()
    }

    fn set_prop(&mut self, node_id: &str, raw_path: &str, value: &Value) -> Result<Step, PatchError> {
        if !self.document.contains_node(node_id) {
            return self.missing(PatchError::NodeNotFound(node_id.to_string()));
        }
        let path = PropPath::parse(raw_path).map_err(|source| PatchError::Path {
            target: node_id.to_string(),
            source,
        })?;

        let node = self.node_mut(node_id)?;
        let previous = set_node_prop(node, &path, value.clone()).map_err(|source| PatchError::Path {
            target: node_id.to_string(),
            source,
        })?;
        let now_absolute = node.layout.position.is_absolute();

        match node_path_impact(&path) {
            PropertyImpact::Geometry => self.recorder.geometry(node_id),
            PropertyImpact::Position => {
                let was_absolute = previous.get("mode").and_then(Value::as_str) == Some("absolute");
                if was_absolute && now_absolute {
                    self.recorder.geometry(node_id);
                } else {
                    self.recorder.layout(node_id);
                }
            }
            PropertyImpact::Paint => self.recorder.paint(node_id),
            PropertyImpact::Layout => self.recorder.layout(node_id),
        }
        self.touched.nodes.insert(node_id.to_string());

        Ok(Step::Applied(vec![PatchOp::set_prop(node_id, raw_path, previous)]))
    }

    fn set_frame_prop(&mut self, frame_id: &str, raw_path: &str, value: &Value) -> Result<Step, PatchError> {
        if !self.document.frames.contains_key(frame_id) {
            return self.missing(PatchError::FrameNotFound(frame_id.to_string()));
        }
        let path = PropPath::parse(raw_path).map_err(|source| PatchError::Path {
            target: frame_id.to_string(),
            source,
        })?;
        let frame = self
            .document
            .frames
            .get_mut(frame_id)
            .map(Arc::make_mut)
            .ok_or_else(|| PatchError::FrameNotFound(frame_id.to_string()))?;
        let previous = set_frame_prop(frame, &path, value.clone()).map_err(|source| PatchError::Path {
            target: frame_id.to_string(),
            source,
        })?;

        self.recorder.frame(frame_id, !frame_path_is_placement_only(&path));
        self.touched.frames.insert(frame_id.to_string());
        Ok(Step::Applied(vec![PatchOp::set_frame_prop(frame_id, raw_path, previous)]))
    }

    /// Claim `child_id` for `parent_id`, refusing anything that would give a
    /// node two parents or a root a parent
    fn check_adoptable(&self, parent_id: &str, child_id: &str) -> Result<(), PatchError> {
        if let Some(current) = self.parents.parent(child_id) {
            return Err(PatchError::ChildAlreadyAttached {
                child: child_id.to_string(),
                parent: current.to_string(),
            });
        }
        if self.is_root(child_id) {
            return Err(PatchError::RootNotDetachable(child_id.to_string()));
        }
        if self.parents.would_cycle(parent_id, child_id) {
            return Err(PatchError::CycleDetected {
                parent: parent_id.to_string(),
                child: child_id.to_string(),
            });
        }
        Ok(())
    }

    fn insert_node(&mut self, node: &Node) -> Result<Step, PatchError> {
        if self.document.contains_node(&node.id) {
            return Err(PatchError::DuplicateId {
                kind: "node",
                id: node.id.clone(),
            });
        }
        validate_node(node).map_err(|source| PatchError::Path {
            target: node.id.clone(),
            source,
        })?;
        for child_id in &node.child_ids {
            self.check_adoptable(&node.id, child_id)?;
            self.parents.set(child_id, &node.id);
        }

        let mut inverse = Vec::with_capacity(node.child_ids.len() + 2);
        // An earlier op in the batch may already list this node as a child
        if let Some(parent_id) = self.parents.parent(&node.id) {
            inverse.push(PatchOp::detach(parent_id, &node.id));
        }
        for child_id in &node.child_ids {
            inverse.push(PatchOp::detach(&node.id, child_id));
        }
        inverse.push(PatchOp::delete(&node.id));

        self.document.nodes.insert(node.id.clone(), Arc::new(node.clone()));
        self.touched.nodes.insert(node.id.clone());
        self.touched.nodes.extend(node.child_ids.iter().cloned());
        self.recorder.layout(&node.id);
        Ok(Step::Applied(inverse))
    }

    fn attach_child(&mut self, parent_id: &str, child_id: &str, index: Option<usize>) -> Result<Step, PatchError> {
        if !self.document.contains_node(parent_id) {
            return self.missing(PatchError::NodeNotFound(parent_id.to_string()));
        }
        if !self.document.contains_node(child_id) {
            return self.missing(PatchError::AttachBeforeInsert(child_id.to_string()));
        }
        self.check_adoptable(parent_id, child_id)?;

        let parent = self.node_mut(parent_id)?;
        let position = index.unwrap_or(parent.child_ids.len()).min(parent.child_ids.len());
        parent.child_ids.insert(position, child_id.to_string());
        self.parents.set(child_id, parent_id);

        self.recorder.layout(parent_id);
        self.recorder.layout(child_id);
        self.touched.nodes.insert(parent_id.to_string());
        self.touched.nodes.insert(child_id.to_string());
        Ok(Step::Applied(vec![PatchOp::detach(parent_id, child_id)]))
    }

    fn detach_child(&mut self, parent_id: &str, child_id: &str) -> Step {
        let Some(position) = self.document.node(parent_id).and_then(|node| node.child_index(child_id)) else {
            return Step::Applied(Vec::new());
        };
        let Ok(parent) = self.node_mut(parent_id) else {
            return Step::Applied(Vec::new());
        };
        parent.child_ids.remove(position);
        let slots = release_slot(parent, child_id);
        self.parents.remove(child_id);

        self.recorder.layout(parent_id);
        self.touched.nodes.insert(parent_id.to_string());
        self.touched.nodes.insert(child_id.to_string());

        let mut inverse = vec![PatchOp::attach(parent_id, child_id, Some(position))];
        if let Some(slots) = slots {
            inverse.push(PatchOp::set_prop(parent_id, "/props/slots", slots));
        }
        Step::Applied(inverse)
    }

    fn delete_node(&mut self, node_id: &str) -> Result<Step, PatchError> {
        if !self.document.contains_node(node_id) {
            return Ok(Step::Applied(Vec::new()));
        }
        if self.parents.parent(node_id).is_some() || self.is_root(node_id) {
            return Err(PatchError::DeleteBeforeDetach {
                node: node_id.to_string(),
            });
        }

        // Descendants first, so the inverse re-inserts leaves before the
        // parents that list them
        let ids = subtree_ids(&self.document, node_id);
        let mut inverse = Vec::with_capacity(ids.len());
        for id in ids.iter().rev() {
            if let Some(node) = self.document.nodes.remove(id) {
                inverse.push(PatchOp::insert_node(node.as_ref().clone()));
            }
            self.parents.remove(id);
            self.touched.nodes.remove(id);
        }
        debug!(node_id, removed = ids.len(), "Deleted subtree");
        Ok(Step::Applied(inverse))
    }

    fn move_node(&mut self, node_id: &str, new_parent_id: &str, index: Option<usize>) -> Result<Step, PatchError> {
        if !self.document.contains_node(node_id) {
            return self.missing(PatchError::NodeNotFound(node_id.to_string()));
        }
        if !self.document.contains_node(new_parent_id) {
            return self.missing(PatchError::NodeNotFound(new_parent_id.to_string()));
        }
        let Some(old_parent_id) = self.parents.parent(node_id).map(str::to_string) else {
            return Err(PatchError::NotAttached(node_id.to_string()));
        };
        if self.parents.would_cycle(new_parent_id, node_id) {
            return Err(PatchError::CycleDetected {
                parent: new_parent_id.to_string(),
                child: node_id.to_string(),
            });
        }

        let old_parent = self.node_mut(&old_parent_id)?;
        let old_position = old_parent
            .child_index(node_id)
            .ok_or_else(|| PatchError::NotAttached(node_id.to_string()))?;
        old_parent.child_ids.remove(old_position);
        let slots = release_slot(old_parent, node_id);

        let new_parent = self.node_mut(new_parent_id)?;
        let position = index.unwrap_or(new_parent.child_ids.len()).min(new_parent.child_ids.len());
        new_parent.child_ids.insert(position, node_id.to_string());
        self.parents.set(node_id, new_parent_id);

        for id in [old_parent_id.as_str(), new_parent_id, node_id] {
            self.recorder.layout(id);
            self.touched.nodes.insert(id.to_string());
        }

        let mut inverse = vec![PatchOp::move_node(node_id, &old_parent_id, Some(old_position))];
        if let Some(slots) = slots {
            inverse.push(PatchOp::set_prop(&old_parent_id, "/props/slots", slots));
        }
        Ok(Step::Applied(inverse))
    }

    fn replace_node(&mut self, node_id: &str, node: &Node) -> Result<Step, PatchError> {
        if node.id != node_id {
            return Err(PatchError::IdMismatch {
                target: node_id.to_string(),
                found: node.id.clone(),
            });
        }
        let Some(previous) = self.document.nodes.get(node_id).cloned() else {
            return Ok(Step::Applied(Vec::new()));
        };
        validate_node(node).map_err(|source| PatchError::Path {
            target: node_id.to_string(),
            source,
        })?;

        for child_id in &previous.child_ids {
            if !node.child_ids.contains(child_id) && self.parents.parent(child_id) == Some(node_id) {
                self.parents.remove(child_id);
                self.touched.nodes.insert(child_id.clone());
            }
        }
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for child_id in &node.child_ids {
            if !seen.insert(child_id.as_str()) {
                return Err(PatchError::ChildAlreadyAttached {
                    child: child_id.clone(),
                    parent: node_id.to_string(),
                });
            }
            if previous.child_ids.contains(child_id) {
                continue;
            }
            self.check_adoptable(node_id, child_id)?;
            self.parents.set(child_id, node_id);
            self.recorder.layout(child_id);
            self.touched.nodes.insert(child_id.clone());
        }

        self.document.nodes.insert(node_id.to_string(), Arc::new(node.clone()));
        self.recorder.layout(node_id);
        self.touched.nodes.insert(node_id.to_string());
        Ok(Step::Applied(vec![PatchOp::replace(previous.as_ref().clone())]))
    }

    fn insert_frame(&mut self, frame: &Frame) -> Result<Step, PatchError> {
        if self.document.frames.contains_key(&frame.id) {
            return Err(PatchError::DuplicateId {
                kind: "frame",
                id: frame.id.clone(),
            });
        }
        self.document.frames.insert(frame.id.clone(), Arc::new(frame.clone()));
        self.touched.frames.insert(frame.id.clone());
        self.recorder.frame(&frame.id, true);
        Ok(Step::Applied(vec![PatchOp::RemoveFrame {
            frame_id: frame.id.clone(),
        }]))
    }

    fn remove_frame(&mut self, frame_id: &str) -> Step {
        let Some(frame) = self.document.frames.remove(frame_id) else {
            return Step::Applied(Vec::new());
        };
        self.touched.frames.remove(frame_id);
        self.recorder.frame(frame_id, false);
        Step::Applied(vec![PatchOp::InsertFrame {
            frame: frame.as_ref().clone(),
        }])
    }

    fn insert_component(&mut self, component: &ComponentDef) -> Result<Step, PatchError> {
        if self.document.components.contains_key(&component.id) {
            return Err(PatchError::DuplicateId {
                kind: "component",
                id: component.id.clone(),
            });
        }
        self.document
            .components
            .insert(component.id.clone(), Arc::new(component.clone()));
        self.touched.components.insert(component.id.clone());
        self.recorder.component(&component.id);
        Ok(Step::Applied(vec![PatchOp::RemoveComponent {
            component_id: component.id.clone(),
        }]))
    }

    fn remove_component(&mut self, component_id: &str) -> Step {
        let Some(component) = self.document.components.remove(component_id) else {
            return Step::Applied(Vec::new());
        };
        self.touched.components.remove(component_id);
        self.touched.components_removed = true;
        self.recorder.component(component_id);
        Step::Applied(vec![PatchOp::InsertComponent {
            component: component.as_ref().clone(),
        }])
    }

    /// Entity-level checks over everything the batch touched
    fn check_integrity(&self) -> Result<(), PatchError> {
        let document = &self.document;

        for id in &self.touched.nodes {
            let Some(node) = document.node(id) else {
                continue;
            };
            for child_id in &node.child_ids {
                if !document.contains_node(child_id) {
                    return Err(PatchError::DanglingNode {
                        parent: id.clone(),
                        child: child_id.clone(),
                    });
                }
            }
            if let Some(instance) = node.as_instance() {
                check_instance(document, node, &instance.component_id)?;
                for slot_id in instance.slots.values().flatten() {
                    if !node.child_ids.contains(slot_id) {
                        return Err(PatchError::DanglingNode {
                            parent: id.clone(),
                            child: slot_id.clone(),
                        });
                    }
                }
            }
            if self.parents.has_cycle_from(id) {
                return Err(PatchError::CycleDetected {
                    parent: self.parents.parent(id).unwrap_or_default().to_string(),
                    child: id.clone(),
                });
            }
            if self.parents.parent(id).is_some() && self.is_root(id) {
                return Err(PatchError::RootNotDetachable(id.clone()));
            }
        }

        if self.touched.components_removed {
            for node in document.nodes.values() {
                if let Some(instance) = node.as_instance() {
                    check_instance(document, node, &instance.component_id)?;
                }
            }
        }

        for id in &self.touched.frames {
            if let Some(frame) = document.frame(id) {
                self.check_root(RootOwner::Frame(id), &frame.root_node_id)?;
            }
        }

        for id in &self.touched.components {
            if let Some(component) = document.component(id) {
                self.check_root(RootOwner::Component(id), &component.root_node_id)?;
            }
        }
        Ok(())
    }

    /// A root must exist, stay unparented and belong to exactly one frame or component
    fn check_root(&self, owner: RootOwner<'_>, root_id: &str) -> Result<(), PatchError> {
        if !self.document.contains_node(root_id) {
            return Err(PatchError::MissingRoot {
                owner: owner.id().to_string(),
                root: root_id.to_string(),
            });
        }
        if self.parents.parent(root_id).is_some() {
            return Err(PatchError::RootNotDetachable(root_id.to_string()));
        }
        if let Some(other) = other_root_owner(&self.document, owner, root_id) {
            return Err(PatchError::DuplicateRoot {
                root: root_id.to_string(),
                first: other.to_string(),
                second: owner.to_string(),
            });
        }
        Ok(())
    }
}

/// Frame or component that claims a root node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RootOwner<'a> {
    Frame(&'a str),
    Component(&'a str),
}

impl RootOwner<'_> {
    pub(crate) fn id(&self) -> &str {
        match self {
            RootOwner::Frame(id) | RootOwner::Component(id) => id,
        }
    }
}

impl std::fmt::Display for RootOwner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootOwner::Frame(id) => write!(f, "frame '{}'", id),
            RootOwner::Component(id) => write!(f, "component '{}'", id),
        }
    }
}

/// Any frame or component other than `owner` whose root is `root_id`
pub(crate) fn other_root_owner<'a>(
    document: &'a EditorDocument,
    owner: RootOwner<'_>,
    root_id: &str,
) -> Option<RootOwner<'a>> {
    let frames = document
        .frames
        .values()
        .filter(|frame| frame.root_node_id == root_id)
        .map(|frame| RootOwner::Frame(frame.id.as_str()));
    let components = document
        .components
        .values()
        .filter(|component| component.root_node_id == root_id)
        .map(|component| RootOwner::Component(component.id.as_str()));
    frames.chain(components).find(|other| *other != owner)
}

fn check_instance(document: &EditorDocument, node: &Node, component_id: &str) -> Result<(), PatchError> {
    if document.component(component_id).is_none() {
        return Err(PatchError::DanglingComponent {
            instance: node.id.clone(),
            component: component_id.to_string(),
        });
    }
    Ok(())
}

/// Drop `child_id` from an instance's slot assignments, returning the
/// assignments as they were
fn release_slot(node: &mut Node, child_id: &str) -> Option<Value> {
    let NodeProps::Instance(props) = &mut node.props else {
        return None;
    };
    if !props.slots.values().flatten().any(|id| id == child_id) {
        return None;
    }
    let previous = serde_json::to_value(&props.slots).ok()?;
    for ids in props.slots.values_mut() {
        ids.retain(|id| id != child_id);
    }
    Some(previous)
}
