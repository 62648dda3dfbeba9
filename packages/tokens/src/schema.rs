//! Token schema: nested named tables of design values.
//!
//! ```json
//! {
//!   "color": { "primary": "#3366ff", "brand": { "accent": "{color.primary}" } },
//!   "spacing": { "sm": 4, "md": 8 },
//!   "radius": { "card": 12 },
//!   "typography": { "body": { "size": 14, "weight": 400 } }
//! }
//! ```
//!
//! A string value of the form `{path}` aliases another token.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Number(f64),
    String(String),
}

impl TokenValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TokenValue::Number(n) => Some(*n),
            TokenValue::String(s) => {
                let trimmed = s.trim();
                let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
                trimmed.parse().ok()
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::String(s) => Some(s),
            TokenValue::Number(_) => None,
        }
    }

    /// Target of a `{path}` alias
    pub fn alias_target(&self) -> Option<&str> {
        self.as_str()?
            .trim()
            .strip_prefix('{')?
            .strip_suffix('}')
            .map(str::trim)
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(n) => write!(f, "{}", n),
            TokenValue::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenEntry {
    Value(TokenValue),
    Group(BTreeMap<String, TokenEntry>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSchema {
    #[serde(default, alias = "colors")]
    pub color: BTreeMap<String, TokenEntry>,
    #[serde(default)]
    pub spacing: BTreeMap<String, TokenEntry>,
    #[serde(default)]
    pub radius: BTreeMap<String, TokenEntry>,
    #[serde(default)]
    pub typography: BTreeMap<String, TokenEntry>,
}

impl TokenSchema {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn tables(&self) -> [(&'static str, &BTreeMap<String, TokenEntry>); 4] {
        [
            ("color", &self.color),
            ("spacing", &self.spacing),
            ("radius", &self.radius),
            ("typography", &self.typography),
        ]
    }

    /// Every leaf as `(dot.path, value)`, in table then key order
    pub fn flatten(&self) -> Vec<(String, TokenValue)> {
        let mut out = Vec::new();
        for (table, entries) in self.tables() {
            flatten_into(table, entries, &mut out);
        }
        out
    }
}

fn flatten_into(prefix: &str, entries: &BTreeMap<String, TokenEntry>, out: &mut Vec<(String, TokenValue)>) {
    for (key, entry) in entries {
        let path = format!("{}.{}", prefix, key);
        match entry {
            TokenEntry::Value(value) => out.push((path, value.clone())),
            TokenEntry::Group(group) => flatten_into(&path, group, out),
        }
    }
}
