use crate::values::NumberValue;
use serde::{Deserialize, Serialize};

/// Width (horizontal) or height (vertical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Horizontal => "width",
            Axis::Vertical => "height",
        }
    }
}

/// How a node is placed inside its parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Position {
    /// Placed by the parent's flow
    #[default]
    Auto,
    /// Explicit offset from the parent's origin
    Absolute { x: NumberValue, y: NumberValue },
}

impl Position {
    pub fn absolute(x: impl Into<NumberValue>, y: impl Into<NumberValue>) -> Self {
        Position::Absolute {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, Position::Absolute { .. })
    }
}

/// Per-axis sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SizeMode {
    Fixed { value: NumberValue },
    /// Size to content
    #[default]
    Hug,
    /// Take the space the parent offers
    Fill,
}

impl SizeMode {
    pub fn fixed(value: impl Into<NumberValue>) -> Self {
        SizeMode::Fixed {
            value: value.into(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, SizeMode::Fixed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SizeMode::Fixed { .. } => "fixed",
            SizeMode::Hug => "hug",
            SizeMode::Fill => "fill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Horizontal,
    #[default]
    Vertical,
}

impl Direction {
    /// The axis children are laid out along
    pub fn main_axis(&self) -> Axis {
        match self {
            Direction::Horizontal => Axis::Horizontal,
            Direction::Vertical => Axis::Vertical,
        }
    }

    pub fn cross_axis(&self) -> Axis {
        match self {
            Direction::Horizontal => Axis::Vertical,
            Direction::Vertical => Axis::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MainAlign {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CrossAlign {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Padding {
    #[serde(default)]
    pub top: NumberValue,
    #[serde(default)]
    pub right: NumberValue,
    #[serde(default)]
    pub bottom: NumberValue,
    #[serde(default)]
    pub left: NumberValue,
}

impl Padding {
    pub fn uniform(value: impl Into<NumberValue>) -> Self {
        let value = value.into();
        Self {
            top: value.clone(),
            right: value.clone(),
            bottom: value.clone(),
            left: value,
        }
    }

    pub(crate) fn sides(&self) -> [(&'static str, &NumberValue); 4] {
        [
            ("top", &self.top),
            ("right", &self.right),
            ("bottom", &self.bottom),
            ("left", &self.left),
        ]
    }
}

/// Flow layout for a container's children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AutoLayout {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub gap: NumberValue,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default)]
    pub main_align: MainAlign,
    #[serde(default)]
    pub cross_align: CrossAlign,
}

impl AutoLayout {
    pub fn vertical() -> Self {
        Self {
            direction: Direction::Vertical,
            ..Self::default()
        }
    }

    pub fn horizontal() -> Self {
        Self {
            direction: Direction::Horizontal,
            ..Self::default()
        }
    }

    pub fn with_gap(mut self, gap: impl Into<NumberValue>) -> Self {
        self.gap = gap.into();
        self
    }

    pub fn with_cross_align(mut self, cross_align: CrossAlign) -> Self {
        self.cross_align = cross_align;
        self
    }

    /// Whether children are stretched along `axis`
    pub fn stretches(&self, axis: Axis) -> bool {
        self.cross_align == CrossAlign::Stretch && self.direction.cross_axis() == axis
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub width: SizeMode,
    #[serde(default)]
    pub height: SizeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_layout: Option<AutoLayout>,
}

impl Layout {
    pub fn size(&self, axis: Axis) -> &SizeMode {
        match axis {
            Axis::Horizontal => &self.width,
            Axis::Vertical => &self.height,
        }
    }

    /// True if the node's size depends on its content on any axis
    pub fn hugs(&self) -> bool {
        matches!(self.width, SizeMode::Hug) || matches!(self.height, SizeMode::Hug)
    }

    /// Absolute position with fixed width and height
    pub fn is_fully_determined(&self) -> bool {
        self.position.is_absolute() && self.width.is_fixed() && self.height.is_fixed()
    }
}
