//! # Property Paths
//!
//! Slash-delimited pointers into a node's or frame's property tree, e.g.
//! `/style/fill` or `/layout/autoLayout/gap`. Segments use JSON-pointer
//! escaping (`~0` for `~`, `~1` for `/`).
//!
//! Resolution is structural: every supported path is matched explicitly
//! against the known schema of its subtree. Values cross the boundary as JSON
//! and are decoded into the typed field, so a wrong shape is a type mismatch
//! rather than a silent coercion.
//!
//! Writes return the previous value, which is what the patch inverter records.

use crate::frame::Frame;
use crate::layout::{AutoLayout, Layout, Position, SizeMode};
use crate::node::{Node, NodeProps};
use crate::style::Style;
use crate::values::{ColorValue, NumberValue, Rect};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use vellum_common::DiagnosticCode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("Invalid path '{path}': {reason}")]
    Invalid { path: String, reason: String },

    #[error("Unknown path '{path}': {reason}")]
    Unknown { path: String, reason: String },

    #[error("Type mismatch at '{path}': {message}")]
    TypeMismatch { path: String, message: String },

    #[error("Value out of range at '{path}': {message}")]
    OutOfRange { path: String, message: String },
}

impl PathError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            PathError::Invalid { .. } => DiagnosticCode::InvalidPath,
            PathError::Unknown { .. } => DiagnosticCode::UnknownPath,
            PathError::TypeMismatch { .. } => DiagnosticCode::TypeMismatch,
            PathError::OutOfRange { .. } => DiagnosticCode::OutOfRange,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            PathError::Invalid { path, .. }
            | PathError::Unknown { path, .. }
            | PathError::TypeMismatch { path, .. }
            | PathError::OutOfRange { path, .. } => path,
        }
    }
}

/// A parsed property path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropPath {
    raw: String,
    segments: Vec<String>,
}

impl PropPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(PathError::Invalid {
                path: raw.to_string(),
                reason: "must start with '/'".to_string(),
            });
        };
        if rest.is_empty() {
            return Err(PathError::Invalid {
                path: raw.to_string(),
                reason: "empty path".to_string(),
            });
        }

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(PathError::Invalid {
                    path: raw.to_string(),
                    reason: "empty segment".to_string(),
                });
            }
            segments.push(unescape(segment, raw)?);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Build a path from unescaped segments
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, PathError> {
        let raw: String = segments
            .iter()
            .map(|segment| format!("/{}", escape(segment.as_ref())))
            .collect();
        Self::parse(&raw)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path with the first segment removed, used for `/<nodeId>/...` override keys
    pub fn split_first(&self) -> Option<(&str, Result<PropPath, PathError>)> {
        let (first, rest) = self.segments.split_first()?;
        Some((first.as_str(), PropPath::from_segments(rest)))
    }
}

impl FromStr for PropPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropPath::parse(s)
    }
}

impl fmt::Display for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn unescape(segment: &str, raw: &str) -> Result<String, PathError> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(PathError::Invalid {
                    path: raw.to_string(),
                    reason: "bad '~' escape".to_string(),
                })
            }
        }
    }
    Ok(out)
}

pub fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// What a node property change can affect downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyImpact {
    /// x/y offset only
    Geometry,
    /// Whole position value: geometry when the mode is unchanged, layout otherwise
    Position,
    /// Appearance of this node only
    Paint,
    /// Size, content or flow; may affect ancestors' auto-layout
    Layout,
}

pub fn node_path_impact(path: &PropPath) -> PropertyImpact {
    let segments: Vec<&str> = path.segments().iter().map(String::as_str).collect();
    match segments.as_slice() {
        ["layout", "position", "x" | "y"] => PropertyImpact::Geometry,
        ["layout", "position"] => PropertyImpact::Position,
        ["name"] => PropertyImpact::Paint,
        ["style", "visible"] | ["style"] => PropertyImpact::Layout,
        ["style", ..] => PropertyImpact::Paint,
        _ => PropertyImpact::Layout,
    }
}

enum Access {
    Get,
    Set(Value),
}

/// Read a node property as JSON. Absent optionals read as `null`.
pub fn get_node_prop(node: &Node, path: &PropPath) -> Result<Value, PathError> {
    let mut scratch = node.clone();
    access_node(&mut scratch, path, Access::Get)
}

/// Write a node property, returning the previous value
pub fn set_node_prop(node: &mut Node, path: &PropPath, value: Value) -> Result<Value, PathError> {
    access_node(node, path, Access::Set(value))
}

pub fn get_frame_prop(frame: &Frame, path: &PropPath) -> Result<Value, PathError> {
    let mut scratch = frame.clone();
    access_frame(&mut scratch, path, Access::Get)
}

pub fn set_frame_prop(frame: &mut Frame, path: &PropPath, value: Value) -> Result<Value, PathError> {
    access_frame(frame, path, Access::Set(value))
}

fn access_node(node: &mut Node, path: &PropPath, access: Access) -> Result<Value, PathError> {
    let segments: Vec<&str> = path.segments().iter().map(String::as_str).collect();
    match segments.as_slice() {
        ["name"] => slot(&mut node.name, access, path),
        ["props"] => {
            let expected = node.node_type();
            slot_checked(&mut node.props, access, path, |props: &NodeProps| {
                if props.node_type() != expected {
                    return Err(Check::Type(format!(
                        "cannot change node type from {} to {}",
                        expected,
                        props.node_type()
                    )));
                }
                check_props(props)
            })
        }
        ["props", rest @ ..] => access_props(&mut node.props, rest, access, path),
        ["layout"] => slot_checked(&mut node.layout, access, path, check_layout),
        ["layout", rest @ ..] => access_layout(&mut node.layout, rest, access, path),
        ["style"] => slot_checked(&mut node.style, access, path, check_style),
        ["style", rest @ ..] => access_style(&mut node.style, rest, access, path),
        _ => Err(unknown(path, "no such node property")),
    }
}

fn access_props(
    props: &mut NodeProps,
    rest: &[&str],
    access: Access,
    path: &PropPath,
) -> Result<Value, PathError> {
    match (props, rest) {
        (NodeProps::Container(p), ["clipContent"]) => slot(&mut p.clip_content, access, path),

        (NodeProps::Text(p), ["text"]) => slot(&mut p.text, access, path),
        (NodeProps::Text(p), ["fontSize"]) => slot_checked(&mut p.font_size, access, path, check_non_negative),
        (NodeProps::Text(p), ["fontWeight"]) => slot_checked(&mut p.font_weight, access, path, |w: &u16| {
            if (1..=1000).contains(w) {
                Ok(())
            } else {
                Err(Check::Range(format!("font weight {} outside 1..=1000", w)))
            }
        }),
        (NodeProps::Text(p), ["color"]) => slot_checked(&mut p.color, access, path, check_optional_color),
        (NodeProps::Text(p), ["align"]) => slot(&mut p.align, access, path),

        (NodeProps::Image(p), ["src"]) => slot(&mut p.src, access, path),
        (NodeProps::Image(p), ["fit"]) => slot(&mut p.fit, access, path),
        (NodeProps::Image(p), ["alt"]) => slot(&mut p.alt, access, path),

        (NodeProps::Icon(p), ["name"]) => slot(&mut p.name, access, path),
        (NodeProps::Icon(p), ["size"]) => slot_checked(&mut p.size, access, path, check_non_negative),
        (NodeProps::Icon(p), ["color"]) => slot_checked(&mut p.color, access, path, check_optional_color),

        (NodeProps::Instance(p), ["componentId"]) => slot_checked(&mut p.component_id, access, path, |id: &String| {
            if id.is_empty() {
                Err(Check::Type("component id must not be empty".to_string()))
            } else {
                Ok(())
            }
        }),
        (NodeProps::Instance(p), ["overrides"]) => slot(&mut p.overrides, access, path),
        (NodeProps::Instance(p), ["overrides", key]) => {
            let previous = p.overrides.get(*key).cloned().unwrap_or(Value::Null);
            if let Access::Set(value) = access {
                if value.is_null() {
                    p.overrides.remove(*key);
                } else {
                    p.overrides.insert(key.to_string(), value);
                }
            }
            Ok(previous)
        }
        (NodeProps::Instance(p), ["slots"]) => slot(&mut p.slots, access, path),
        (NodeProps::Instance(p), ["slots", key]) => {
            let previous = match p.slots.get(*key) {
                Some(ids) => to_json(ids, path)?,
                None => Value::Null,
            };
            if let Access::Set(value) = access {
                if value.is_null() {
                    p.slots.remove(*key);
                } else {
                    let ids: Vec<String> = decode(value, path)?;
                    p.slots.insert(key.to_string(), ids);
                }
            }
            Ok(previous)
        }

        (NodeProps::Slot(p), ["key"]) => slot(&mut p.key, access, path),

        (props, _) => Err(unknown(
            path,
            &format!("no such property on a {} node", props.node_type()),
        )),
    }
}

fn access_layout(
    layout: &mut Layout,
    rest: &[&str],
    access: Access,
    path: &PropPath,
) -> Result<Value, PathError> {
    match rest {
        ["position"] => slot(&mut layout.position, access, path),
        ["position", axis @ ("x" | "y")] => match &mut layout.position {
            Position::Absolute { x, y } => {
                let target = if *axis == "x" { x } else { y };
                slot(target, access, path)
            }
            Position::Auto => Err(unknown(path, "position is not absolute")),
        },
        ["width"] => slot_checked(&mut layout.width, access, path, check_size),
        ["height"] => slot_checked(&mut layout.height, access, path, check_size),
        ["autoLayout"] => slot_checked(&mut layout.auto_layout, access, path, |auto: &Option<AutoLayout>| {
            match auto {
                Some(auto) => check_auto_layout(auto),
                None => Ok(()),
            }
        }),
        ["autoLayout", field @ ..] => {
            let Some(auto) = layout.auto_layout.as_mut() else {
                return Err(unknown(path, "auto layout is not set"));
            };
            match field {
                ["direction"] => slot(&mut auto.direction, access, path),
                ["gap"] => slot_checked(&mut auto.gap, access, path, check_non_negative),
                ["padding"] => slot_checked(&mut auto.padding, access, path, |padding: &crate::layout::Padding| {
                    for (side, value) in padding.sides() {
                        if !value.is_non_negative() {
                            return Err(Check::Range(format!("padding {} must be non-negative", side)));
                        }
                    }
                    Ok(())
                }),
                ["padding", "top"] => slot_checked(&mut auto.padding.top, access, path, check_non_negative),
                ["padding", "right"] => slot_checked(&mut auto.padding.right, access, path, check_non_negative),
                ["padding", "bottom"] => slot_checked(&mut auto.padding.bottom, access, path, check_non_negative),
                ["padding", "left"] => slot_checked(&mut auto.padding.left, access, path, check_non_negative),
                ["mainAlign"] => slot(&mut auto.main_align, access, path),
                ["crossAlign"] => slot(&mut auto.cross_align, access, path),
                _ => Err(unknown(path, "no such auto layout property")),
            }
        }
        _ => Err(unknown(path, "no such layout property")),
    }
}

fn access_style(
    style: &mut Style,
    rest: &[&str],
    access: Access,
    path: &PropPath,
) -> Result<Value, PathError> {
    match rest {
        ["fill"] => slot_checked(&mut style.fill, access, path, check_optional_color),
        ["stroke"] => slot_checked(&mut style.stroke, access, path, |stroke: &Option<crate::style::Stroke>| {
            match stroke {
                Some(stroke) => {
                    check_color(&stroke.color)?;
                    check_non_negative(&stroke.width)
                }
                None => Ok(()),
            }
        }),
        ["stroke", field] => {
            let Some(stroke) = style.stroke.as_mut() else {
                return Err(unknown(path, "stroke is not set"));
            };
            match *field {
                "color" => slot_checked(&mut stroke.color, access, path, check_color),
                "width" => slot_checked(&mut stroke.width, access, path, check_non_negative),
                _ => Err(unknown(path, "no such stroke property")),
            }
        }
        ["radius"] => slot_checked(&mut style.radius, access, path, check_radius),
        ["radius", "topLeft"] => slot_checked(&mut style.radius.top_left, access, path, check_non_negative),
        ["radius", "topRight"] => slot_checked(&mut style.radius.top_right, access, path, check_non_negative),
        ["radius", "bottomRight"] => slot_checked(&mut style.radius.bottom_right, access, path, check_non_negative),
        ["radius", "bottomLeft"] => slot_checked(&mut style.radius.bottom_left, access, path, check_non_negative),
        ["opacity"] => slot_checked(&mut style.opacity, access, path, check_opacity),
        ["visible"] => slot(&mut style.visible, access, path),
        ["shadow"] => slot_checked(&mut style.shadow, access, path, |shadow: &Option<crate::style::Shadow>| {
            match shadow {
                Some(shadow) => {
                    check_color(&shadow.color)?;
                    check_non_negative(&shadow.blur)
                }
                None => Ok(()),
            }
        }),
        _ => Err(unknown(path, "no such style property")),
    }
}

fn access_frame(frame: &mut Frame, path: &PropPath, access: Access) -> Result<Value, PathError> {
    let segments: Vec<&str> = path.segments().iter().map(String::as_str).collect();
    match segments.as_slice() {
        ["name"] => slot(&mut frame.name, access, path),
        ["placement"] => slot_checked(&mut frame.placement, access, path, |rect: &Rect| {
            if rect.width < 0.0 || rect.height < 0.0 {
                Err(Check::Range("frame size must be non-negative".to_string()))
            } else {
                Ok(())
            }
        }),
        ["placement", "x"] => slot(&mut frame.placement.x, access, path),
        ["placement", "y"] => slot(&mut frame.placement.y, access, path),
        ["placement", "width"] => slot_checked(&mut frame.placement.width, access, path, check_non_negative_f64),
        ["placement", "height"] => slot_checked(&mut frame.placement.height, access, path, check_non_negative_f64),
        ["kind"] => slot(&mut frame.kind, access, path),
        _ => Err(unknown(path, "no such frame property")),
    }
}

/// Frame paths that move the frame without resizing it
pub fn frame_path_is_placement_only(path: &PropPath) -> bool {
    let segments: Vec<&str> = path.segments().iter().map(String::as_str).collect();
    matches!(segments.as_slice(), ["placement", "x" | "y"] | ["name"] | ["kind"])
}

/// Failure of a value check, before it is tied to a path
enum Check {
    Type(String),
    Range(String),
}

fn slot<T>(target: &mut T, access: Access, path: &PropPath) -> Result<Value, PathError>
where
    T: Serialize + DeserializeOwned,
{
    slot_checked(target, access, path, |_: &T| Ok(()))
}

fn slot_checked<T, F>(target: &mut T, access: Access, path: &PropPath, check: F) -> Result<Value, PathError>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> Result<(), Check>,
{
    let previous = to_json(&*target, path)?;
    if let Access::Set(value) = access {
        let decoded: T = decode(value, path)?;
        check(&decoded).map_err(|failure| match failure {
            Check::Type(message) => PathError::TypeMismatch {
                path: path.to_string(),
                message,
            },
            Check::Range(message) => PathError::OutOfRange {
                path: path.to_string(),
                message,
            },
        })?;
        *target = decoded;
    }
    Ok(previous)
}

fn to_json<T: Serialize + ?Sized>(value: &T, path: &PropPath) -> Result<Value, PathError> {
    serde_json::to_value(value).map_err(|e| PathError::TypeMismatch {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(value: Value, path: &PropPath) -> Result<T, PathError> {
    serde_json::from_value(value).map_err(|e| PathError::TypeMismatch {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn unknown(path: &PropPath, reason: &str) -> PathError {
    PathError::Unknown {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn check_non_negative(value: &NumberValue) -> Result<(), Check> {
    if value.is_non_negative() {
        Ok(())
    } else {
        Err(Check::Range(format!("{} must be non-negative", value)))
    }
}

fn check_non_negative_f64(value: &f64) -> Result<(), Check> {
    if *value >= 0.0 {
        Ok(())
    } else {
        Err(Check::Range(format!("{} must be non-negative", value)))
    }
}

fn check_opacity(value: &f64) -> Result<(), Check> {
    if (0.0..=1.0).contains(value) {
        Ok(())
    } else {
        Err(Check::Range(format!("opacity {} outside 0..=1", value)))
    }
}

fn check_color(color: &ColorValue) -> Result<(), Check> {
    if color.is_valid() {
        Ok(())
    } else {
        Err(Check::Type(format!("{:?} is not a hex color or token", color)))
    }
}

fn check_optional_color(color: &Option<ColorValue>) -> Result<(), Check> {
    match color {
        Some(color) => check_color(color),
        None => Ok(()),
    }
}

fn check_size(size: &SizeMode) -> Result<(), Check> {
    match size {
        SizeMode::Fixed { value } => check_non_negative(value),
        SizeMode::Hug | SizeMode::Fill => Ok(()),
    }
}

fn check_radius(radius: &crate::style::CornerRadius) -> Result<(), Check> {
    for (corner, value) in radius.corners() {
        if !value.is_non_negative() {
            return Err(Check::Range(format!("radius {} must be non-negative", corner)));
        }
    }
    Ok(())
}

fn check_auto_layout(auto: &AutoLayout) -> Result<(), Check> {
    check_non_negative(&auto.gap)?;
    for (side, value) in auto.padding.sides() {
        if !value.is_non_negative() {
            return Err(Check::Range(format!("padding {} must be non-negative", side)));
        }
    }
    Ok(())
}

fn check_layout(layout: &Layout) -> Result<(), Check> {
    check_size(&layout.width)?;
    check_size(&layout.height)?;
    match &layout.auto_layout {
        Some(auto) => check_auto_layout(auto),
        None => Ok(()),
    }
}

fn check_style(style: &Style) -> Result<(), Check> {
    check_optional_color(&style.fill)?;
    if let Some(stroke) = &style.stroke {
        check_color(&stroke.color)?;
        check_non_negative(&stroke.width)?;
    }
    check_radius(&style.radius)?;
    check_opacity(&style.opacity)?;
    if let Some(shadow) = &style.shadow {
        check_color(&shadow.color)?;
        check_non_negative(&shadow.blur)?;
    }
    Ok(())
}

fn check_props(props: &NodeProps) -> Result<(), Check> {
    match props {
        NodeProps::Text(p) => {
            check_non_negative(&p.font_size)?;
            check_optional_color(&p.color)?;
            if !(1..=1000).contains(&p.font_weight) {
                return Err(Check::Range(format!("font weight {} outside 1..=1000", p.font_weight)));
            }
            Ok(())
        }
        NodeProps::Icon(p) => {
            check_non_negative(&p.size)?;
            check_optional_color(&p.color)
        }
        NodeProps::Instance(p) if p.component_id.is_empty() => {
            Err(Check::Type("component id must not be empty".to_string()))
        }
        NodeProps::Container(_)
        | NodeProps::Image(_)
        | NodeProps::Spacer(_)
        | NodeProps::Instance(_)
        | NodeProps::Slot(_) => Ok(()),
    }
}

/// Validate every value of a whole node, as done for inserted or replaced nodes
pub fn validate_node(node: &Node) -> Result<(), PathError> {
    let checks: [(&str, Result<(), Check>); 3] = [
        ("/props", check_props(&node.props)),
        ("/layout", check_layout(&node.layout)),
        ("/style", check_style(&node.style)),
    ];
    for (path, result) in checks {
        if let Err(failure) = result {
            return Err(match failure {
                Check::Type(message) => PathError::TypeMismatch {
                    path: path.to_string(),
                    message,
                },
                Check::Range(message) => PathError::OutOfRange {
                    path: path.to_string(),
                    message,
                },
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{AutoLayout, CrossAlign};
    use serde_json::json;

    fn path(raw: &str) -> PropPath {
        PropPath::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        assert!(matches!(PropPath::parse("style/fill"), Err(PathError::Invalid { .. })));
        assert!(matches!(PropPath::parse("/"), Err(PathError::Invalid { .. })));
        assert!(matches!(PropPath::parse("/style//fill"), Err(PathError::Invalid { .. })));
        assert!(matches!(PropPath::parse("/a~2"), Err(PathError::Invalid { .. })));
    }

    #[test]
    fn test_escaped_segments_round_trip() {
        let p = PropPath::from_segments(&["props", "overrides", "/n_label/props/text"]).unwrap();
        assert_eq!(p.as_str(), "/props/overrides/~1n_label~1props~1text");
        assert_eq!(p.segments()[2], "/n_label/props/text");
    }

    #[test]
    fn test_set_text_returns_previous_value() {
        let mut node = Node::text("t", "Hi");
        let previous = set_node_prop(&mut node, &path("/props/text"), json!("Bye")).unwrap();
        assert_eq!(previous, json!("Hi"));
        assert_eq!(get_node_prop(&node, &path("/props/text")).unwrap(), json!("Bye"));
    }

    #[test]
    fn test_optional_fields_read_null_and_clear_with_null() {
        let mut node = Node::container("c");
        assert_eq!(get_node_prop(&node, &path("/style/fill")).unwrap(), Value::Null);

        set_node_prop(&mut node, &path("/style/fill"), json!("#ff0000")).unwrap();
        assert_eq!(node.style.fill, Some(ColorValue::hex("#ff0000")));

        let previous = set_node_prop(&mut node, &path("/style/fill"), Value::Null).unwrap();
        assert_eq!(previous, json!("#ff0000"));
        assert_eq!(node.style.fill, None);
    }

    #[test]
    fn test_prop_not_on_variant_is_unknown() {
        let mut node = Node::container("c");
        let err = set_node_prop(&mut node, &path("/props/text"), json!("x")).unwrap_err();
        assert_eq!(err.code(), DiagnosticCode::UnknownPath);
    }

    #[test]
    fn test_type_mismatch_leaves_node_untouched() {
        let mut node = Node::text("t", "Hi");
        let err = set_node_prop(&mut node, &path("/props/text"), json!(42)).unwrap_err();
        assert_eq!(err.code(), DiagnosticCode::TypeMismatch);
        assert_eq!(node, Node::text("t", "Hi"));
    }

    #[test]
    fn test_opacity_out_of_range() {
        let mut node = Node::container("c");
        let err = set_node_prop(&mut node, &path("/style/opacity"), json!(1.5)).unwrap_err();
        assert_eq!(err.code(), DiagnosticCode::OutOfRange);
    }

    #[test]
    fn test_invalid_color_literal_is_type_mismatch() {
        let mut node = Node::container("c");
        let err = set_node_prop(&mut node, &path("/style/fill"), json!("blue")).unwrap_err();
        assert_eq!(err.code(), DiagnosticCode::TypeMismatch);
    }

    #[test]
    fn test_auto_layout_fields_require_auto_layout() {
        let mut node = Node::container("c");
        let err = set_node_prop(&mut node, &path("/layout/autoLayout/gap"), json!(8)).unwrap_err();
        assert_eq!(err.code(), DiagnosticCode::UnknownPath);

        node.layout.auto_layout = Some(AutoLayout::vertical());
        set_node_prop(&mut node, &path("/layout/autoLayout/gap"), json!(8)).unwrap();
        set_node_prop(&mut node, &path("/layout/autoLayout/crossAlign"), json!("stretch")).unwrap();
        let auto = node.layout.auto_layout.as_ref().unwrap();
        assert_eq!(auto.gap, NumberValue::Fixed(8.0));
        assert_eq!(auto.cross_align, CrossAlign::Stretch);
    }

    #[test]
    fn test_position_axes_only_when_absolute() {
        let mut node = Node::container("c");
        assert!(set_node_prop(&mut node, &path("/layout/position/x"), json!(4)).is_err());

        node.layout.position = Position::absolute(1.0, 2.0);
        let previous = set_node_prop(&mut node, &path("/layout/position/x"), json!(4)).unwrap();
        assert_eq!(previous, json!(1.0));
    }

    #[test]
    fn test_token_reference_accepted_for_numbers() {
        let mut node = Node::container("c").with_auto_layout(AutoLayout::vertical());
        set_node_prop(&mut node, &path("/layout/autoLayout/gap"), json!({"token": "spacing.md"})).unwrap();
        assert_eq!(
            node.layout.auto_layout.unwrap().gap,
            NumberValue::token("spacing.md")
        );
    }

    #[test]
    fn test_props_cannot_change_node_type() {
        let mut node = Node::text("t", "Hi");
        let err = set_node_prop(&mut node, &path("/props"), json!({"type": "container"})).unwrap_err();
        assert_eq!(err.code(), DiagnosticCode::TypeMismatch);
    }

    #[test]
    fn test_override_entries_insert_and_remove() {
        let mut node = Node::instance("i", "card");
        let p = PropPath::from_segments(&["props", "overrides", "title"]).unwrap();
        assert_eq!(set_node_prop(&mut node, &p, json!("Hello")).unwrap(), Value::Null);
        assert_eq!(node.as_instance().unwrap().overrides["title"], json!("Hello"));
        assert_eq!(set_node_prop(&mut node, &p, Value::Null).unwrap(), json!("Hello"));
        assert!(node.as_instance().unwrap().overrides.is_empty());
    }

    #[test]
    fn test_frame_placement_paths() {
        let mut frame = Frame::new("f", "root", Rect::new(0.0, 0.0, 100.0, 50.0));
        set_frame_prop(&mut frame, &path("/placement/x"), json!(25.0)).unwrap();
        assert_eq!(frame.placement.x, 25.0);
        let err = set_frame_prop(&mut frame, &path("/placement/width"), json!(-1.0)).unwrap_err();
        assert_eq!(err.code(), DiagnosticCode::OutOfRange);
        assert!(frame_path_is_placement_only(&path("/placement/y")));
        assert!(!frame_path_is_placement_only(&path("/placement/width")));
    }

    #[test]
    fn test_impact_classification() {
        assert_eq!(node_path_impact(&path("/layout/position/x")), PropertyImpact::Geometry);
        assert_eq!(node_path_impact(&path("/layout/position")), PropertyImpact::Position);
        assert_eq!(node_path_impact(&path("/style/fill")), PropertyImpact::Paint);
        assert_eq!(node_path_impact(&path("/style/visible")), PropertyImpact::Layout);
        assert_eq!(node_path_impact(&path("/props/text")), PropertyImpact::Layout);
    }

    #[test]
    fn test_validate_node_catches_bad_values() {
        let mut node = Node::container("c");
        node.style.opacity = 3.0;
        assert_eq!(validate_node(&node).unwrap_err().code(), DiagnosticCode::OutOfRange);
    }
}
