//! Expanded scene: the flattened node graph after instance resolution.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use vellum_common::Diagnostic;
use vellum_model::{
    ContainerProps, IconProps, ImageProps, Layout, NodeId, NodeType, SpacerProps, Style, TextProps,
};

/// Separator between an instance id and a cloned local id
pub const NAMESPACE_SEPARATOR: &str = "::";

pub fn namespaced(prefix: &str, local_id: &str) -> String {
    format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, local_id)
}

/// Concrete props. Instances and slots have already been replaced by
/// containers, so only renderable variants remain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExpandedProps {
    Container(ContainerProps),
    Text(TextProps),
    Image(ImageProps),
    Icon(IconProps),
    Spacer(SpacerProps),
}

impl ExpandedProps {
    pub fn node_type(&self) -> NodeType {
        match self {
            ExpandedProps::Container(_) => NodeType::Container,
            ExpandedProps::Text(_) => NodeType::Text,
            ExpandedProps::Image(_) => NodeType::Image,
            ExpandedProps::Icon(_) => NodeType::Icon,
            ExpandedProps::Spacer(_) => NodeType::Spacer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedNode {
    pub id: String,
    /// Document (or component-local) node this was produced from
    pub source_id: NodeId,
    /// Type of the source node before expansion
    pub source_type: NodeType,
    /// Editable document node; `None` inside component instances
    pub patch_target: Option<NodeId>,
    pub name: String,
    pub props: ExpandedProps,
    pub layout: Layout,
    pub style: Style,
    pub child_ids: Vec<String>,
    pub parent: Option<String>,
    /// Slot key when this node is a slot container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_key: Option<String>,
}

impl ExpandedNode {
    pub fn node_type(&self) -> NodeType {
        self.props.node_type()
    }

    pub fn is_editable(&self) -> bool {
        self.patch_target.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedScene {
    pub frame_id: String,
    pub root_id: String,
    pub nodes: BTreeMap<String, ExpandedNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ExpandedScene {
    pub fn node(&self, id: &str) -> Option<&ExpandedNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> Option<&ExpandedNode> {
        self.nodes.get(&self.root_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent_of(&self, id: &str) -> Option<&ExpandedNode> {
        let parent = self.nodes.get(id)?.parent.as_deref()?;
        self.nodes.get(parent)
    }

    /// Mapping from expanded id to the editable document node
    pub fn patch_target(&self, id: &str) -> Option<&str> {
        self.nodes.get(id)?.patch_target.as_deref()
    }

    /// Expanded ids produced from any of the given document node ids.
    ///
    /// Component-local ids map to every namespaced clone of that node.
    pub fn expanded_ids_for<'a, I>(&self, doc_ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let wanted: BTreeSet<&str> = doc_ids.into_iter().map(String::as_str).collect();
        if wanted.is_empty() {
            return BTreeSet::new();
        }
        let mut ids = BTreeSet::new();
        let mut stack: Vec<&str> = Vec::new();
        for node in self.nodes.values() {
            if !wanted.contains(node.source_id.as_str()) {
                continue;
            }
            ids.insert(node.id.clone());
            // Overrides and slot assignments live on the instance, so its
            // clones go stale with it
            if node.source_type == NodeType::Instance {
                stack.extend(node.child_ids.iter().map(String::as_str));
            }
        }
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if ids.insert(node.id.clone()) {
                stack.extend(node.child_ids.iter().map(String::as_str));
            }
        }
        ids
    }

    /// Expanded ids in depth-first pre-order from the root
    pub fn pre_order(&self) -> Vec<&str> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root_id.as_str()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.child_ids.iter().rev().map(String::as_str));
        }
        order
    }
}
