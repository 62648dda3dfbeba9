//! Render-ready output: resolved property bags keyed by expanded id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use vellum_common::Diagnostic;
use vellum_model::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderType {
    Box,
    Row,
    Column,
    Text,
    Image,
    Icon,
    Spacer,
}

impl RenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderType::Box => "box",
            RenderType::Row => "row",
            RenderType::Column => "column",
            RenderType::Text => "text",
            RenderType::Image => "image",
            RenderType::Icon => "icon",
            RenderType::Spacer => "spacer",
        }
    }
}

impl fmt::Display for RenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved property value. Colors are normalized hex strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl RenderValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RenderValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RenderValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RenderValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for RenderValue {
    fn from(value: f64) -> Self {
        RenderValue::Number(value)
    }
}

impl From<bool> for RenderValue {
    fn from(value: bool) -> Self {
        RenderValue::Bool(value)
    }
}

impl From<String> for RenderValue {
    fn from(value: String) -> Self {
        RenderValue::String(value)
    }
}

impl From<&str> for RenderValue {
    fn from(value: &str) -> Self {
        RenderValue::String(value.to_string())
    }
}

/// Per-axis sizes known at compile time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: String,
    pub render_type: RenderType,
    pub props: BTreeMap<String, RenderValue>,
    pub child_ids: Vec<String>,
    /// Parent-relative rect, present only for absolute nodes with fixed size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    #[serde(default)]
    pub known_size: KnownSize,
}

impl RenderNode {
    pub fn prop(&self, key: &str) -> Option<&RenderValue> {
        self.props.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDocument {
    pub frame_id: String,
    pub root_id: String,
    pub nodes: BTreeMap<String, Arc<RenderNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderDocument {
    pub fn node(&self, id: &str) -> Option<&Arc<RenderNode>> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> Option<&Arc<RenderNode>> {
        self.nodes.get(&self.root_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
