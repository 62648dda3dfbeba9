//! # Editor Document
//!
//! Aggregate root: three flat id-keyed mappings plus a document id and schema
//! version. Relationships are id lookups only, never embedded nesting.
//!
//! Entries are stored behind `Arc`, so cloning a document copies pointers and
//! leaves node values shared. A new document value is produced for every
//! applied patch batch while earlier values stay valid for undo.

use crate::component::ComponentDef;
use crate::error::ModelError;
use crate::frame::Frame;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorDocument {
    pub id: String,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub frames: BTreeMap<String, Arc<Frame>>,
    #[serde(default)]
    pub nodes: BTreeMap<String, Arc<Node>>,
    #[serde(default)]
    pub components: BTreeMap<String, Arc<ComponentDef>>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl EditorDocument {
    /// Create an empty document
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            schema_version: SCHEMA_VERSION,
            frames: BTreeMap::new(),
            nodes: BTreeMap::new(),
            components: BTreeMap::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id).map(|node| node.as_ref())
    }

    pub fn frame(&self, id: &str) -> Option<&Frame> {
        self.frames.get(id).map(|frame| frame.as_ref())
    }

    pub fn component(&self, id: &str) -> Option<&ComponentDef> {
        self.components.get(id).map(|component| component.as_ref())
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Children of `id` in order, skipping dangling references
    pub fn children<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Node> + 'a {
        let child_ids = self
            .nodes
            .get(id)
            .map(|node| node.child_ids.as_slice())
            .unwrap_or(&[]);
        child_ids.iter().filter_map(move |child| self.node(child))
    }

    /// Frame whose root is `node_id`
    pub fn frame_with_root(&self, node_id: &str) -> Option<&Frame> {
        self.frames
            .values()
            .find(|frame| frame.root_node_id == node_id)
            .map(|frame| frame.as_ref())
    }

    /// Component whose root is `node_id`
    pub fn component_with_root(&self, node_id: &str) -> Option<&ComponentDef> {
        self.components
            .values()
            .find(|component| component.root_node_id == node_id)
            .map(|component| component.as_ref())
    }

    /// Ids of every instance node referencing `component_id`
    pub fn instances_of<'a>(&'a self, component_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.nodes.values().filter_map(move |node| match node.as_instance() {
            Some(props) if props.component_id == component_id => Some(node.id.as_str()),
            _ => None,
        })
    }

    /// Builder-style insertion used when assembling documents outside the
    /// patch protocol (fixtures, importers).
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.insert(node.id.clone(), Arc::new(node));
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.insert(frame.id.clone(), Arc::new(frame));
        self
    }

    pub fn with_component(mut self, component: ComponentDef) -> Self {
        self.components
            .insert(component.id.clone(), Arc::new(component));
        self
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let document: EditorDocument = serde_json::from_str(json)?;
        if document.schema_version > SCHEMA_VERSION {
            return Err(ModelError::UnsupportedSchema {
                found: document.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(document)
    }
}
