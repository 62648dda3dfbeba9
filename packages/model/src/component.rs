use crate::node::NodeId;
use serde::{Deserialize, Serialize};

pub type ComponentId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Color,
}

impl ParamType {
    /// Whether a JSON value is acceptable for this parameter
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number() || value.get("token").is_some(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Color => value.is_string() || value.get("token").is_some(),
        }
    }
}

/// Which descendant property a parameter drives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamBinding {
    /// Node id local to the component's subtree
    pub node_id: NodeId,
    /// Property path on that node, e.g. `/props/text`
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentParam {
    pub key: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub default: serde_json::Value,
    pub binding: ParamBinding,
}

/// Reusable component. Its root subtree is private and never shared with a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub id: ComponentId,
    #[serde(default)]
    pub name: String,
    pub root_node_id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ComponentParam>,
}

impl ComponentDef {
    pub fn new(id: impl Into<String>, root_node_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            root_node_id: root_node_id.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(
        mut self,
        key: impl Into<String>,
        param_type: ParamType,
        default: serde_json::Value,
        node_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.params.push(ComponentParam {
            key: key.into(),
            param_type,
            default,
            binding: ParamBinding {
                node_id: node_id.into(),
                path: path.into(),
            },
        });
        self
    }

    pub fn param(&self, key: &str) -> Option<&ComponentParam> {
        self.params.iter().find(|param| param.key == key)
    }
}
