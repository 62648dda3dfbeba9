use crate::node::NodeId;
use crate::values::Rect;
use serde::{Deserialize, Serialize};

pub type FrameId = String;

/// What a frame shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FrameKind {
    /// Plain design surface
    #[default]
    Design,
    /// Surface that displays a component definition
    #[serde(rename_all = "camelCase")]
    Component {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component_id: Option<String>,
    },
}

/// Top-level placement of a node tree on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: FrameId,
    #[serde(default)]
    pub name: String,
    pub root_node_id: NodeId,
    /// World-space position and size
    pub placement: Rect,
    #[serde(default)]
    pub kind: FrameKind,
}

impl Frame {
    pub fn new(id: impl Into<String>, root_node_id: impl Into<String>, placement: Rect) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            root_node_id: root_node_id.into(),
            placement,
            kind: FrameKind::Design,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_kind(mut self, kind: FrameKind) -> Self {
        self.kind = kind;
        self
    }
}
