//! Clipboard payload: a detached copy of one or more subtrees plus the anchor
//! point they were copied relative to.

use crate::document::EditorDocument;
use crate::id_generator::IdGenerator;
use crate::node::{Node, NodeId, NodeProps};
use crate::values::Point;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use vellum_common::{Diagnostic, DiagnosticCode, Location};

pub const CLIPBOARD_TYPE: &str = "vellum/clipboard";
pub const CLIPBOARD_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard payload has type '{0}', expected 'vellum/clipboard'")]
    ForeignPayload(String),

    #[error("Clipboard payload version {0} is not supported")]
    UnsupportedVersion(u64),

    #[error("Malformed clipboard payload: {0}")]
    Malformed(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

impl ClipboardError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ClipboardError::ForeignPayload(_) => DiagnosticCode::ForeignPayload,
            ClipboardError::UnsupportedVersion(_) => DiagnosticCode::UnsupportedVersion,
            ClipboardError::Malformed(_) => DiagnosticCode::MalformedPayload,
            ClipboardError::NodeNotFound(_) => DiagnosticCode::NodeNotFound,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code(), self.to_string());
        match self {
            ClipboardError::NodeNotFound(id) => diagnostic.at(Location::node(id.clone())),
            _ => diagnostic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardPayload {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub version: u32,
    pub root_ids: Vec<NodeId>,
    pub nodes: BTreeMap<NodeId, Node>,
    #[serde(default)]
    pub anchor: Point,
}

impl ClipboardPayload {
    /// Copy the subtrees rooted at `ids`. Ids nested inside another selected
    /// subtree are copied once, as part of that subtree.
    pub fn capture(
        document: &EditorDocument,
        ids: &[NodeId],
        anchor: Point,
    ) -> Result<Self, ClipboardError> {
        let mut nested: HashSet<&str> = HashSet::new();
        for id in ids {
            if !document.contains_node(id) {
                return Err(ClipboardError::NodeNotFound(id.clone()));
            }
            let mut stack: Vec<&str> = document
                .node(id)
                .map(|node| node.child_ids.iter().map(String::as_str).collect())
                .unwrap_or_default();
            while let Some(current) = stack.pop() {
                if !nested.insert(current) {
                    continue;
                }
                if let Some(node) = document.node(current) {
                    stack.extend(node.child_ids.iter().map(String::as_str));
                }
            }
        }

        let mut root_ids: Vec<NodeId> = Vec::new();
        for id in ids {
            if !nested.contains(id.as_str()) && !root_ids.contains(id) {
                root_ids.push(id.clone());
            }
        }

        let mut nodes = BTreeMap::new();
        let mut stack: Vec<&str> = root_ids.iter().map(String::as_str).collect();
        while let Some(current) = stack.pop() {
            if nodes.contains_key(current) {
                continue;
            }
            if let Some(node) = document.node(current) {
                stack.extend(node.child_ids.iter().map(String::as_str));
                nodes.insert(current.to_string(), node.clone());
            }
        }

        Ok(Self {
            payload_type: CLIPBOARD_TYPE.to_string(),
            version: CLIPBOARD_VERSION,
            root_ids,
            nodes,
            anchor,
        })
    }

    pub fn to_json(&self) -> Result<String, ClipboardError> {
        serde_json::to_string(self).map_err(|e| ClipboardError::Malformed(e.to_string()))
    }

    /// Decode a payload, rejecting anything not produced by this format
    pub fn from_json(json: &str) -> Result<Self, ClipboardError> {
        let raw: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ClipboardError::Malformed(e.to_string()))?;

        match raw.get("type").and_then(|t| t.as_str()) {
            Some(CLIPBOARD_TYPE) => {}
            Some(other) => return Err(ClipboardError::ForeignPayload(other.to_string())),
            None => return Err(ClipboardError::ForeignPayload(String::new())),
        }
        match raw.get("version").and_then(|v| v.as_u64()) {
            Some(version) if version == u64::from(CLIPBOARD_VERSION) => {}
            Some(version) => return Err(ClipboardError::UnsupportedVersion(version)),
            None => return Err(ClipboardError::Malformed("missing version".to_string())),
        }

        let payload: ClipboardPayload =
            serde_json::from_value(raw).map_err(|e| ClipboardError::Malformed(e.to_string()))?;
        for id in &payload.root_ids {
            if !payload.nodes.contains_key(id) {
                return Err(ClipboardError::Malformed(format!("root '{}' has no node", id)));
            }
        }
        Ok(payload)
    }

    /// Give every node a fresh id, rewriting child and slot references.
    /// Returns the old → new mapping.
    pub fn remap_ids(
        &mut self,
        ids: &mut IdGenerator,
        taken: impl Fn(&str) -> bool,
    ) -> BTreeMap<NodeId, NodeId> {
        let mapping: BTreeMap<NodeId, NodeId> = self
            .nodes
            .keys()
            .map(|old| (old.clone(), ids.fresh_id(&taken)))
            .collect();
        let rename = |id: &NodeId| mapping.get(id).cloned().unwrap_or_else(|| id.clone());

        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .into_values()
            .map(|mut node| {
                node.id = rename(&node.id);
                node.child_ids = node.child_ids.iter().map(rename).collect();
                if let NodeProps::Instance(props) = &mut node.props {
                    for assigned in props.slots.values_mut() {
                        *assigned = assigned.iter().map(rename).collect();
                    }
                }
                (node.id.clone(), node)
            })
            .collect();
        self.root_ids = self.root_ids.iter().map(rename).collect();
        mapping
    }
}
