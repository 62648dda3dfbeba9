//! Scalar value types shared by layout, style and props.
//!
//! Numbers and colors are either literal or a reference to a design token.
//! Token references stay symbolic in the document; the render compiler resolves
//! them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic reference to a design token, e.g. `{"token": "spacing.md"}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRef {
    pub token: String,
}

/// A number that is either a literal or a token reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberValue {
    Fixed(f64),
    Token(TokenRef),
}

impl NumberValue {
    pub fn fixed(value: f64) -> Self {
        NumberValue::Fixed(value)
    }

    pub fn token(path: impl Into<String>) -> Self {
        NumberValue::Token(TokenRef { token: path.into() })
    }

    pub fn as_fixed(&self) -> Option<f64> {
        match self {
            NumberValue::Fixed(value) => Some(*value),
            NumberValue::Token(_) => None,
        }
    }

    pub fn token_path(&self) -> Option<&str> {
        match self {
            NumberValue::Fixed(_) => None,
            NumberValue::Token(token) => Some(&token.token),
        }
    }

    /// Literal values must be non-negative. Tokens are checked at resolution time.
    pub(crate) fn is_non_negative(&self) -> bool {
        match self {
            NumberValue::Fixed(value) => *value >= 0.0,
            NumberValue::Token(_) => true,
        }
    }
}

impl Default for NumberValue {
    fn default() -> Self {
        NumberValue::Fixed(0.0)
    }
}

impl From<f64> for NumberValue {
    fn from(value: f64) -> Self {
        NumberValue::Fixed(value)
    }
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberValue::Fixed(value) => write!(f, "{}", value),
            NumberValue::Token(token) => write!(f, "{{{}}}", token.token),
        }
    }
}

/// A color that is either a hex literal or a token reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Literal(String),
    Token(TokenRef),
}

impl ColorValue {
    pub fn hex(value: impl Into<String>) -> Self {
        ColorValue::Literal(value.into())
    }

    pub fn token(path: impl Into<String>) -> Self {
        ColorValue::Token(TokenRef { token: path.into() })
    }

    pub fn token_path(&self) -> Option<&str> {
        match self {
            ColorValue::Literal(_) => None,
            ColorValue::Token(token) => Some(&token.token),
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        match self {
            ColorValue::Literal(value) => is_hex_color(value),
            ColorValue::Token(token) => !token.token.is_empty(),
        }
    }
}

/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalize a hex color to lowercase `#rrggbb` / `#rrggbbaa`.
///
/// Returns `None` for anything that is not a hex color.
pub fn normalize_hex_color(value: &str) -> Option<String> {
    if !is_hex_color(value) {
        return None;
    }
    let digits = &value[1..];
    let expanded: String = match digits.len() {
        3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
        _ => digits.to_string(),
    };
    Some(format!("#{}", expanded.to_ascii_lowercase()))
}

/// A point in frame or world space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
