//! # Render Compiler
//!
//! Maps an [`ExpandedScene`] to a [`RenderDocument`]: render types, a flat
//! bag of token-free property values, and bounds where they can be derived
//! analytically.
//!
//! The compiler keeps one cached [`RenderNode`] per expanded id. `compile`
//! reuses the cached `Arc` for every id outside the dirty set, so unchanged
//! nodes are identical by pointer across compiles. A recompiled node whose
//! sizing signature changed forces its whole subtree to recompile, since fill
//! validation below it reads that signature. Swapping the token resolver
//! (a new generation) invalidates everything.

use crate::render_node::{KnownSize, RenderDocument, RenderNode, RenderType, RenderValue};
use crate::sizing::{fill_is_bounded, SizingSignature};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use vellum_common::{Diagnostic, DiagnosticCode, Location};
use vellum_model::{
    Axis, ColorValue, CrossAlign, Direction, ImageFit, MainAlign, NumberValue, Position, Rect,
    SizeMode, TextAlign,
};
use vellum_scene::{ExpandedNode, ExpandedProps, ExpandedScene};
use vellum_tokens::TokenResolver;

struct CacheEntry {
    node: Arc<RenderNode>,
    diagnostics: Vec<Diagnostic>,
    signature: SizingSignature,
    parent: Option<String>,
}

#[derive(Default)]
pub struct RenderCompiler {
    cache: HashMap<String, CacheEntry>,
    dirty: HashSet<String>,
    token_generation: Option<u64>,
}

impl RenderCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark expanded ids as stale
    pub fn mark_dirty<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirty.extend(ids.into_iter().map(Into::into));
    }

    /// Drop every cached node
    pub fn mark_all_dirty(&mut self) {
        self.cache.clear();
        self.dirty.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    #[instrument(skip_all, fields(frame_id = %scene.frame_id, nodes = scene.len(), dirty = self.dirty.len()))]
    pub fn compile(&mut self, scene: &ExpandedScene, tokens: &TokenResolver) -> RenderDocument {
        if self.token_generation != Some(tokens.generation()) {
            if self.token_generation.is_some() {
                debug!("Token set changed, dropping render cache");
            }
            self.cache.clear();
            self.token_generation = Some(tokens.generation());
        }

        let mut nodes = BTreeMap::new();
        let mut diagnostics = Vec::new();
        let mut forced: HashSet<String> = HashSet::new();
        let mut reused = 0usize;

        for id in scene.pre_order() {
            let Some(expanded) = scene.node(id) else {
                continue;
            };

            if !self.dirty.contains(id) && !forced.contains(id) {
                if let Some(entry) = self.cache.get(id) {
                    if entry.parent == expanded.parent && entry.node.child_ids == expanded.child_ids {
                        nodes.insert(id.to_string(), Arc::clone(&entry.node));
                        diagnostics.extend(entry.diagnostics.iter().cloned());
                        reused += 1;
                        continue;
                    }
                }
            }

            let (node, node_diagnostics) = compile_node(scene, expanded, tokens);
            let signature = SizingSignature::of(&expanded.layout);
            // Fill checks below depend on the whole ancestor chain
            if let Some(previous) = self.cache.get(id) {
                if previous.signature != signature || previous.parent != expanded.parent {
                    collect_descendants(scene, expanded, &mut forced);
                }
            }

            let node = Arc::new(node);
            diagnostics.extend(node_diagnostics.iter().cloned());
            nodes.insert(id.to_string(), Arc::clone(&node));
            self.cache.insert(
                id.to_string(),
                CacheEntry {
                    node,
                    diagnostics: node_diagnostics,
                    signature,
                    parent: expanded.parent.clone(),
                },
            );
        }

        let before = self.cache.len();
        self.cache.retain(|id, _| scene.nodes.contains_key(id));
        self.dirty.clear();

        debug!(
            reused,
            compiled = nodes.len() - reused,
            evicted = before - self.cache.len(),
            "Compiled render document"
        );

        RenderDocument {
            frame_id: scene.frame_id.clone(),
            root_id: scene.root_id.clone(),
            nodes,
            diagnostics,
        }
    }
}

/// Compile a scene without a cache
pub fn compile_scene(scene: &ExpandedScene, tokens: &TokenResolver) -> RenderDocument {
    RenderCompiler::new().compile(scene, tokens)
}

fn collect_descendants(scene: &ExpandedScene, node: &ExpandedNode, out: &mut HashSet<String>) {
    let mut stack: Vec<&str> = node.child_ids.iter().map(String::as_str).collect();
    while let Some(id) = stack.pop() {
        if !out.insert(id.to_string()) {
            continue;
        }
        if let Some(child) = scene.node(id) {
            stack.extend(child.child_ids.iter().map(String::as_str));
        }
    }
}

pub fn render_type(node: &ExpandedNode) -> RenderType {
    match &node.props {
        ExpandedProps::Container(_) => match node.layout.auto_layout.as_ref().map(|auto| auto.direction) {
            Some(Direction::Horizontal) => RenderType::Row,
            Some(Direction::Vertical) => RenderType::Column,
            None => RenderType::Box,
        },
        ExpandedProps::Text(_) => RenderType::Text,
        ExpandedProps::Image(_) => RenderType::Image,
        ExpandedProps::Icon(_) => RenderType::Icon,
        ExpandedProps::Spacer(_) => RenderType::Spacer,
    }
}

/// Property bag under construction for one node
struct PropBag<'a> {
    node_id: &'a str,
    tokens: &'a TokenResolver,
    props: BTreeMap<String, RenderValue>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> PropBag<'a> {
    fn put(&mut self, key: &str, value: impl Into<RenderValue>) {
        self.props.insert(key.to_string(), value.into());
    }

    fn number(&mut self, key: &str, value: &NumberValue, fallback: f64) -> f64 {
        let resolved = match self.tokens.number(value) {
            Ok(resolved) => resolved,
            Err(err) => {
                self.unresolved(key, &err.to_string());
                fallback
            }
        };
        self.put(key, resolved);
        resolved
    }

    /// Resolve a color; an unresolved color leaves the key unset
    fn color(&mut self, key: &str, value: &ColorValue) {
        match self.tokens.color(value) {
            Ok(hex) => self.put(key, hex),
            Err(err) => self.unresolved(key, &err.to_string()),
        }
    }

    fn unresolved(&mut self, key: &str, message: &str) {
        warn!(node_id = self.node_id, key, "{}", message);
        self.diagnostics.push(
            Diagnostic::warning(DiagnosticCode::UnresolvedToken, message.to_string())
                .at(Location::node(self.node_id).with_path(key)),
        );
    }
}

fn compile_node(scene: &ExpandedScene, node: &ExpandedNode, tokens: &TokenResolver) -> (RenderNode, Vec<Diagnostic>) {
    let mut bag = PropBag {
        node_id: &node.id,
        tokens,
        props: BTreeMap::new(),
        diagnostics: Vec::new(),
    };

    let mut known_size = KnownSize::default();
    for axis in [Axis::Horizontal, Axis::Vertical] {
        let (mode_key, value_key) = match axis {
            Axis::Horizontal => ("widthMode", "width"),
            Axis::Vertical => ("heightMode", "height"),
        };
        match node.layout.size(axis) {
            SizeMode::Fixed { value } => {
                bag.put(mode_key, "fixed");
                let resolved = bag.number(value_key, value, 0.0);
                match axis {
                    Axis::Horizontal => known_size.width = Some(resolved),
                    Axis::Vertical => known_size.height = Some(resolved),
                }
            }
            SizeMode::Hug => bag.put(mode_key, "hug"),
            SizeMode::Fill => {
                if fill_is_bounded(scene, node, axis) {
                    bag.put(mode_key, "fill");
                } else {
                    let message = format!(
                        "'{}' fills its {} but no ancestor bounds that axis; rendering at intrinsic size",
                        node.id,
                        axis.name()
                    );
                    warn!(node_id = %node.id, axis = axis.name(), "Unbounded fill");
                    bag.diagnostics.push(
                        Diagnostic::warning(DiagnosticCode::UnboundedFill, message)
                            .at(Location::node(node.id.clone()).with_path(format!("/layout/{}", value_key))),
                    );
                    bag.put(mode_key, "hug");
                }
            }
        }
    }

    let mut offset = None;
    match &node.layout.position {
        Position::Auto => bag.put("position", "auto"),
        Position::Absolute { x, y } => {
            bag.put("position", "absolute");
            let x = bag.number("x", x, 0.0);
            let y = bag.number("y", y, 0.0);
            offset = Some((x, y));
        }
    }

    if let Some(auto) = &node.layout.auto_layout {
        bag.number("gap", &auto.gap, 0.0);
        bag.number("paddingTop", &auto.padding.top, 0.0);
        bag.number("paddingRight", &auto.padding.right, 0.0);
        bag.number("paddingBottom", &auto.padding.bottom, 0.0);
        bag.number("paddingLeft", &auto.padding.left, 0.0);
        bag.put("mainAlign", main_align_name(auto.main_align));
        bag.put("crossAlign", cross_align_name(auto.cross_align));
    }

    let style = &node.style;
    bag.put("visible", style.visible);
    bag.put("opacity", style.opacity);
    if let Some(fill) = &style.fill {
        bag.color("fill", fill);
    }
    if let Some(stroke) = &style.stroke {
        bag.color("stroke", &stroke.color);
        bag.number("strokeWidth", &stroke.width, 1.0);
    }
    let radius = &style.radius;
    if [&radius.top_left, &radius.top_right, &radius.bottom_right, &radius.bottom_left]
        .iter()
        .any(|corner| **corner != NumberValue::Fixed(0.0))
    {
        bag.number("radiusTopLeft", &radius.top_left, 0.0);
        bag.number("radiusTopRight", &radius.top_right, 0.0);
        bag.number("radiusBottomRight", &radius.bottom_right, 0.0);
        bag.number("radiusBottomLeft", &radius.bottom_left, 0.0);
    }
    if let Some(shadow) = &style.shadow {
        bag.color("shadowColor", &shadow.color);
        bag.number("shadowX", &shadow.x, 0.0);
        bag.number("shadowY", &shadow.y, 0.0);
        bag.number("shadowBlur", &shadow.blur, 0.0);
        bag.number("shadowSpread", &shadow.spread, 0.0);
    }

    match &node.props {
        ExpandedProps::Container(container) => {
            if container.clip_content {
                bag.put("clipContent", true);
            }
        }
        ExpandedProps::Text(text) => {
            bag.put("text", text.text.as_str());
            bag.number("fontSize", &text.font_size, 14.0);
            bag.put("fontWeight", f64::from(text.font_weight));
            if let Some(color) = &text.color {
                bag.color("color", color);
            }
            bag.put("textAlign", text_align_name(text.align));
        }
        ExpandedProps::Image(image) => {
            bag.put("src", image.src.as_str());
            bag.put("fit", image_fit_name(image.fit));
            if let Some(alt) = &image.alt {
                bag.put("alt", alt.as_str());
            }
        }
        ExpandedProps::Icon(icon) => {
            bag.put("name", icon.name.as_str());
            bag.number("size", &icon.size, 16.0);
            if let Some(color) = &icon.color {
                bag.color("color", color);
            }
        }
        ExpandedProps::Spacer(_) => {}
    }

    let bounds = match (offset, known_size.width, known_size.height) {
        (Some((x, y)), Some(width), Some(height)) => Some(Rect::new(x, y, width, height)),
        _ => None,
    };

    let render_node = RenderNode {
        id: node.id.clone(),
        render_type: render_type(node),
        props: bag.props,
        child_ids: node.child_ids.clone(),
        bounds,
        known_size,
    };
    (render_node, bag.diagnostics)
}

fn main_align_name(align: MainAlign) -> &'static str {
    match align {
        MainAlign::Start => "start",
        MainAlign::Center => "center",
        MainAlign::End => "end",
        MainAlign::SpaceBetween => "spaceBetween",
    }
}

fn cross_align_name(align: CrossAlign) -> &'static str {
    match align {
        CrossAlign::Start => "start",
        CrossAlign::Center => "center",
        CrossAlign::End => "end",
        CrossAlign::Stretch => "stretch",
    }
}

fn text_align_name(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Start => "start",
        TextAlign::Center => "center",
        TextAlign::End => "end",
    }
}

fn image_fit_name(fit: ImageFit) -> &'static str {
    match fit {
        ImageFit::Cover => "cover",
        ImageFit::Contain => "contain",
        ImageFit::Fill => "fill",
    }
}
