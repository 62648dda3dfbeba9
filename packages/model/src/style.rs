use crate::values::{ColorValue, NumberValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: ColorValue,
    #[serde(default = "default_stroke_width")]
    pub width: NumberValue,
}

fn default_stroke_width() -> NumberValue {
    NumberValue::Fixed(1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CornerRadius {
    #[serde(default)]
    pub top_left: NumberValue,
    #[serde(default)]
    pub top_right: NumberValue,
    #[serde(default)]
    pub bottom_right: NumberValue,
    #[serde(default)]
    pub bottom_left: NumberValue,
}

impl CornerRadius {
    pub fn uniform(value: impl Into<NumberValue>) -> Self {
        let value = value.into();
        Self {
            top_left: value.clone(),
            top_right: value.clone(),
            bottom_right: value.clone(),
            bottom_left: value,
        }
    }

    pub(crate) fn corners(&self) -> [(&'static str, &NumberValue); 4] {
        [
            ("topLeft", &self.top_left),
            ("topRight", &self.top_right),
            ("bottomRight", &self.bottom_right),
            ("bottomLeft", &self.bottom_left),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: ColorValue,
    #[serde(default)]
    pub x: NumberValue,
    #[serde(default)]
    pub y: NumberValue,
    #[serde(default)]
    pub blur: NumberValue,
    #[serde(default)]
    pub spread: NumberValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default)]
    pub radius: CornerRadius,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            radius: CornerRadius::default(),
            opacity: default_opacity(),
            visible: default_visible(),
            shadow: None,
        }
    }
}

impl Style {
    pub fn with_fill(mut self, fill: ColorValue) -> Self {
        self.fill = Some(fill);
        self
    }
}
