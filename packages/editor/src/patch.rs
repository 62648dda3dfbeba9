//! Patch protocol: the only way a document changes.
//!
//! Ops are plain data with a stable JSON shape (`{"op": "setProp", ...}`) so
//! that tools outside the process can emit them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vellum_model::{ComponentDef, Frame, Node, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PatchOp {
    #[serde(rename_all = "camelCase")]
    SetProp {
        node_id: NodeId,
        path: String,
        value: Value,
    },

    #[serde(rename_all = "camelCase")]
    SetFrameProp {
        frame_id: String,
        path: String,
        value: Value,
    },

    /// Adds a detached node. Its `childIds` may name nodes inserted later in
    /// the same batch.
    InsertNode { node: Node },

    #[serde(rename_all = "camelCase")]
    AttachChild {
        parent_id: NodeId,
        child_id: NodeId,
        /// Append when absent; clamped to the child count
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    #[serde(rename_all = "camelCase")]
    DetachChild { parent_id: NodeId, child_id: NodeId },

    /// Removes a detached node and its whole subtree
    #[serde(rename_all = "camelCase")]
    DeleteNode { node_id: NodeId },

    #[serde(rename_all = "camelCase")]
    MoveNode {
        node_id: NodeId,
        new_parent_id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    #[serde(rename_all = "camelCase")]
    ReplaceNode { node_id: NodeId, node: Node },

    InsertFrame { frame: Frame },

    #[serde(rename_all = "camelCase")]
    RemoveFrame { frame_id: String },

    InsertComponent { component: ComponentDef },

    #[serde(rename_all = "camelCase")]
    RemoveComponent { component_id: String },
}

impl PatchOp {
    pub fn set_prop(node_id: impl Into<String>, path: impl Into<String>, value: Value) -> Self {
        PatchOp::SetProp {
            node_id: node_id.into(),
            path: path.into(),
            value,
        }
    }

    pub fn set_frame_prop(frame_id: impl Into<String>, path: impl Into<String>, value: Value) -> Self {
        PatchOp::SetFrameProp {
            frame_id: frame_id.into(),
            path: path.into(),
            value,
        }
    }

    pub fn insert_node(node: Node) -> Self {
        PatchOp::InsertNode { node }
    }

    pub fn attach(parent_id: impl Into<String>, child_id: impl Into<String>, index: Option<usize>) -> Self {
        PatchOp::AttachChild {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            index,
        }
    }

    pub fn detach(parent_id: impl Into<String>, child_id: impl Into<String>) -> Self {
        PatchOp::DetachChild {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
        }
    }

    pub fn delete(node_id: impl Into<String>) -> Self {
        PatchOp::DeleteNode {
            node_id: node_id.into(),
        }
    }

    pub fn move_node(node_id: impl Into<String>, new_parent_id: impl Into<String>, index: Option<usize>) -> Self {
        PatchOp::MoveNode {
            node_id: node_id.into(),
            new_parent_id: new_parent_id.into(),
            index,
        }
    }

    pub fn replace(node: Node) -> Self {
        PatchOp::ReplaceNode {
            node_id: node.id.clone(),
            node,
        }
    }

    /// Op name as it appears in the `op` field
    pub fn kind(&self) -> &'static str {
        match self {
            PatchOp::SetProp { .. } => "setProp",
            PatchOp::SetFrameProp { .. } => "setFrameProp",
            PatchOp::InsertNode { .. } => "insertNode",
            PatchOp::AttachChild { .. } => "attachChild",
            PatchOp::DetachChild { .. } => "detachChild",
            PatchOp::DeleteNode { .. } => "deleteNode",
            PatchOp::MoveNode { .. } => "moveNode",
            PatchOp::ReplaceNode { .. } => "replaceNode",
            PatchOp::InsertFrame { .. } => "insertFrame",
            PatchOp::RemoveFrame { .. } => "removeFrame",
            PatchOp::InsertComponent { .. } => "insertComponent",
            PatchOp::RemoveComponent { .. } => "removeComponent",
        }
    }

    /// Id of the entity the op primarily acts on
    pub fn target_id(&self) -> &str {
        match self {
            PatchOp::SetProp { node_id, .. }
            | PatchOp::DeleteNode { node_id }
            | PatchOp::MoveNode { node_id, .. }
            | PatchOp::ReplaceNode { node_id, .. } => node_id,
            PatchOp::SetFrameProp { frame_id, .. } | PatchOp::RemoveFrame { frame_id } => frame_id,
            PatchOp::InsertNode { node } => &node.id,
            PatchOp::AttachChild { child_id, .. } | PatchOp::DetachChild { child_id, .. } => child_id,
            PatchOp::InsertFrame { frame } => &frame.id,
            PatchOp::InsertComponent { component } => &component.id,
            PatchOp::RemoveComponent { component_id } => component_id,
        }
    }

    /// Parse a single op or an array of ops
    pub fn batch_from_json(json: &str) -> Result<Vec<PatchOp>, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Array(_) => serde_json::from_value(value),
            other => Ok(vec![serde_json::from_value(other)?]),
        }
    }
}

/// How unknown targets are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Unknown targets reject the batch
    #[default]
    Strict,
    /// Unknown targets are skipped with a warning
    Lenient,
}
