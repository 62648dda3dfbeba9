//! # Nodes
//!
//! The atomic tree unit. A node's type tag is derived from its props variant,
//! so the two can never disagree. Children are referenced by id; parentage is
//! derived by the document store and never stored on the node.

use crate::layout::{AutoLayout, Layout, Position, SizeMode};
use crate::style::Style;
use crate::values::{ColorValue, NumberValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Container,
    Text,
    Image,
    Icon,
    Spacer,
    Instance,
    Slot,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Container => "container",
            NodeType::Text => "text",
            NodeType::Image => "image",
            NodeType::Icon => "icon",
            NodeType::Spacer => "spacer",
            NodeType::Instance => "instance",
            NodeType::Slot => "slot",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContainerProps {
    #[serde(default)]
    pub clip_content: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: NumberValue,
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
    #[serde(default)]
    pub align: TextAlign,
}

fn default_font_size() -> NumberValue {
    NumberValue::Fixed(14.0)
}

fn default_font_weight() -> u16 {
    400
}

impl TextProps {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            color: None,
            align: TextAlign::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ImageFit {
    #[default]
    Cover,
    Contain,
    Fill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    pub src: String,
    #[serde(default)]
    pub fit: ImageFit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconProps {
    pub name: String,
    #[serde(default = "default_icon_size")]
    pub size: NumberValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
}

fn default_icon_size() -> NumberValue {
    NumberValue::Fixed(16.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpacerProps {}

/// A placement of a component.
///
/// `overrides` maps either a component parameter key or a
/// `/<localNodeId>/<property path>` pointer to a JSON value. Slot content nodes
/// are children of the instance (so they have exactly one parent) and are
/// assigned to slot keys through `slots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceProps {
    pub component_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, Vec<NodeId>>,
}

impl InstanceProps {
    pub fn of(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            overrides: BTreeMap::new(),
            slots: BTreeMap::new(),
        }
    }
}

/// Insertion point inside a component. Default content is the slot's own children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotProps {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeProps {
    Container(ContainerProps),
    Text(TextProps),
    Image(ImageProps),
    Icon(IconProps),
    Spacer(SpacerProps),
    Instance(InstanceProps),
    Slot(SlotProps),
}

impl NodeProps {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeProps::Container(_) => NodeType::Container,
            NodeProps::Text(_) => NodeType::Text,
            NodeProps::Image(_) => NodeType::Image,
            NodeProps::Icon(_) => NodeType::Icon,
            NodeProps::Spacer(_) => NodeType::Spacer,
            NodeProps::Instance(_) => NodeType::Instance,
            NodeProps::Slot(_) => NodeType::Slot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    pub props: NodeProps,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<NodeId>,
}

impl Node {
    pub fn new(id: impl Into<String>, props: NodeProps) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            props,
            layout: Layout::default(),
            style: Style::default(),
            child_ids: Vec::new(),
        }
    }

    pub fn container(id: impl Into<String>) -> Self {
        Self::new(id, NodeProps::Container(ContainerProps::default()))
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, NodeProps::Text(TextProps::new(text)))
    }

    pub fn image(id: impl Into<String>, src: impl Into<String>) -> Self {
        Self::new(
            id,
            NodeProps::Image(ImageProps {
                src: src.into(),
                fit: ImageFit::default(),
                alt: None,
            }),
        )
    }

    pub fn icon(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(
            id,
            NodeProps::Icon(IconProps {
                name: name.into(),
                size: default_icon_size(),
                color: None,
            }),
        )
    }

    pub fn spacer(id: impl Into<String>) -> Self {
        Self::new(id, NodeProps::Spacer(SpacerProps::default()))
    }

    pub fn instance(id: impl Into<String>, component_id: impl Into<String>) -> Self {
        Self::new(id, NodeProps::Instance(InstanceProps::of(component_id)))
    }

    pub fn slot(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(id, NodeProps::Slot(SlotProps { key: key.into() }))
    }

    pub fn node_type(&self) -> NodeType {
        self.props.node_type()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_children<I, S>(mut self, child_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.child_ids = child_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.layout.position = position;
        self
    }

    pub fn with_size(mut self, width: SizeMode, height: SizeMode) -> Self {
        self.layout.width = width;
        self.layout.height = height;
        self
    }

    pub fn with_auto_layout(mut self, auto_layout: AutoLayout) -> Self {
        self.layout.auto_layout = Some(auto_layout);
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        if let NodeProps::Instance(props) = &mut self.props {
            props.overrides.insert(key.into(), value);
        }
        self
    }

    pub fn with_slot_content<I, S>(mut self, key: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if let NodeProps::Instance(props) = &mut self.props {
            for id in &ids {
                if !self.child_ids.contains(id) {
                    self.child_ids.push(id.clone());
                }
            }
            props.slots.insert(key.into(), ids);
        }
        self
    }

    pub fn as_instance(&self) -> Option<&InstanceProps> {
        match &self.props {
            NodeProps::Instance(props) => Some(props),
            _ => None,
        }
    }

    pub fn as_slot(&self) -> Option<&SlotProps> {
        match &self.props {
            NodeProps::Slot(props) => Some(props),
            _ => None,
        }
    }

    pub fn child_index(&self, child_id: &str) -> Option<usize> {
        self.child_ids.iter().position(|id| id == child_id)
    }
}
