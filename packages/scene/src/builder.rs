//! # Expanded Scene Builder
//!
//! Flattens a frame's node tree into an [`ExpandedScene`]:
//!
//! - Plain nodes copy through with their own id as expanded id and patch target.
//! - An instance becomes a wrapper container (same id, editable) whose single
//!   child is a clone of the component root. Cloned ids are namespaced as
//!   `instanceId::localId` and carry no patch target.
//! - Slots become containers holding either the instance's content for that
//!   key (expanded in the scope where the instance was authored) or the slot's
//!   own default children.
//!
//! Every scope carries the chain of components being expanded. Re-entering a
//! component already on the chain emits `INSTANCE_CYCLE` and omits the
//! instance.

use crate::error::SceneError;
use crate::expanded::{namespaced, ExpandedNode, ExpandedProps, ExpandedScene};
use crate::overrides::apply_overrides;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use vellum_common::{Diagnostic, DiagnosticCode, Location};
use vellum_model::{EditorDocument, FrameKind, InstanceProps, Node, NodeId, NodeProps};

pub(crate) type NodeMap = BTreeMap<NodeId, Arc<Node>>;

/// Where ids are looked up and how they are namespaced
struct Scope<'a> {
    /// Namespace prefix; `None` for the document itself
    prefix: Option<String>,
    nodes: &'a NodeMap,
    /// Components currently being expanded, outermost first
    chain: Vec<String>,
    fill: Option<SlotFill<'a>>,
}

/// Slot content of the instance that opened a scope
struct SlotFill<'a> {
    slots: &'a BTreeMap<String, Vec<NodeId>>,
    outer: &'a Scope<'a>,
}

impl Scope<'_> {
    fn expanded_id(&self, local_id: &str) -> String {
        match &self.prefix {
            Some(prefix) => namespaced(prefix, local_id),
            None => local_id.to_string(),
        }
    }

    fn patch_target(&self, local_id: &str) -> Option<NodeId> {
        match self.prefix {
            Some(_) => None,
            None => Some(local_id.to_string()),
        }
    }
}

struct Expansion<'d> {
    document: &'d EditorDocument,
    frame_id: &'d str,
    nodes: BTreeMap<String, ExpandedNode>,
    reserved: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'d> Expansion<'d> {
    fn location(&self, node_id: &str) -> Location {
        Location {
            frame_id: Some(self.frame_id.to_string()),
            ..Location::node(node_id)
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!(code = %diagnostic.code, frame_id = self.frame_id, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    fn expand(&mut self, local_id: &str, scope: &Scope<'_>, parent: Option<&str>) -> Option<String> {
        let id = scope.expanded_id(local_id);
        let Some(node) = scope.nodes.get(local_id).cloned() else {
            let location = self.location(&id);
            self.report(
                Diagnostic::warning(
                    DiagnosticCode::DanglingNode,
                    format!("Node '{}' does not exist", local_id),
                )
                .at(location),
            );
            return None;
        };

        if let NodeProps::Instance(instance) = &node.props {
            if scope.chain.contains(&instance.component_id) {
                let location = self.location(&id);
                self.report(
                    Diagnostic::warning(
                        DiagnosticCode::InstanceCycle,
                        format!(
                            "Instance '{}' re-enters component '{}' ({} → {})",
                            id,
                            instance.component_id,
                            scope.chain.join(" → "),
                            instance.component_id
                        ),
                    )
                    .at(location),
                );
                return None;
            }
        }

        if !self.reserved.insert(id.clone()) {
            let location = self.location(&id);
            self.report(
                Diagnostic::warning(
                    DiagnosticCode::DuplicateExpandedId,
                    format!("Expanded id '{}' is produced twice; keeping the first", id),
                )
                .at(location),
            );
            return None;
        }

        let mut slot_key = None;
        let mut child_ids = Vec::new();
        let props = match &node.props {
            NodeProps::Container(props) => {
                self.expand_all(&node.child_ids, scope, &id, &mut child_ids);
                ExpandedProps::Container(props.clone())
            }
            NodeProps::Text(props) => {
                self.expand_all(&node.child_ids, scope, &id, &mut child_ids);
                ExpandedProps::Text(props.clone())
            }
            NodeProps::Image(props) => {
                self.expand_all(&node.child_ids, scope, &id, &mut child_ids);
                ExpandedProps::Image(props.clone())
            }
            NodeProps::Icon(props) => {
                self.expand_all(&node.child_ids, scope, &id, &mut child_ids);
                ExpandedProps::Icon(props.clone())
            }
            NodeProps::Spacer(props) => {
                self.expand_all(&node.child_ids, scope, &id, &mut child_ids);
                ExpandedProps::Spacer(props.clone())
            }
            NodeProps::Slot(slot) => {
                slot_key = Some(slot.key.clone());
                let inserted = scope.fill.as_ref().and_then(|fill| {
                    fill.slots
                        .get(&slot.key)
                        .filter(|content| !content.is_empty())
                        .map(|content| (content, fill.outer))
                });
                match inserted {
                    Some((content, outer)) => self.expand_all(content, outer, &id, &mut child_ids),
                    None => self.expand_all(&node.child_ids, scope, &id, &mut child_ids),
                }
                ExpandedProps::Container(Default::default())
            }
            NodeProps::Instance(instance) => {
                if let Some(root) = self.expand_instance(instance, scope, &id) {
                    child_ids.push(root);
                }
                ExpandedProps::Container(Default::default())
            }
        };

        self.nodes.insert(
            id.clone(),
            ExpandedNode {
                id: id.clone(),
                source_id: node.id.clone(),
                source_type: node.node_type(),
                patch_target: scope.patch_target(local_id),
                name: node.name.clone(),
                props,
                layout: node.layout.clone(),
                style: node.style.clone(),
                child_ids,
                parent: parent.map(str::to_string),
                slot_key,
            },
        );
        Some(id)
    }

    fn expand_all(&mut self, local_ids: &[NodeId], scope: &Scope<'_>, parent: &str, out: &mut Vec<String>) {
        for local_id in local_ids {
            if let Some(id) = self.expand(local_id, scope, Some(parent)) {
                out.push(id);
            }
        }
    }

    /// Expand the component behind `instance`, returning the cloned root's id
    fn expand_instance(&mut self, instance: &InstanceProps, scope: &Scope<'_>, wrapper_id: &str) -> Option<String> {
        let Some(component) = self.document.components.get(&instance.component_id).cloned() else {
            let location = self.location(wrapper_id);
            self.report(
                Diagnostic::warning(
                    DiagnosticCode::DanglingComponent,
                    format!("Component '{}' does not exist", instance.component_id),
                )
                .at(location),
            );
            return None;
        };

        let mut clones = clone_subtree(self.document, &component.root_node_id);
        if clones.is_empty() {
            let location = self.location(wrapper_id);
            self.report(
                Diagnostic::warning(
                    DiagnosticCode::MissingRoot,
                    format!(
                        "Component '{}' root '{}' does not exist",
                        component.id, component.root_node_id
                    ),
                )
                .at(location),
            );
            return None;
        }

        for diagnostic in apply_overrides(&component, instance, wrapper_id, &mut clones) {
            self.diagnostics.push(diagnostic);
        }

        let mut chain = scope.chain.clone();
        chain.push(component.id.clone());
        let inner = Scope {
            prefix: Some(wrapper_id.to_string()),
            nodes: &clones,
            chain,
            fill: Some(SlotFill {
                slots: &instance.slots,
                outer: scope,
            }),
        };
        self.expand(&component.root_node_id, &inner, Some(wrapper_id))
    }
}

/// Shallow (`Arc`) copy of every node reachable from `root_id`
fn clone_subtree(document: &EditorDocument, root_id: &str) -> NodeMap {
    let mut clones = NodeMap::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if clones.contains_key(id) {
            continue;
        }
        if let Some(node) = document.nodes.get(id) {
            stack.extend(node.child_ids.iter().map(String::as_str));
            clones.insert(id.to_string(), Arc::clone(node));
        }
    }
    clones
}

/// Expand one frame of `document`
#[instrument(skip(document), fields(document_id = %document.id))]
pub fn build_scene(document: &EditorDocument, frame_id: &str) -> Result<ExpandedScene, SceneError> {
    let frame = document
        .frame(frame_id)
        .ok_or_else(|| SceneError::FrameNotFound(frame_id.to_string()))?;
    if !document.contains_node(&frame.root_node_id) {
        return Err(SceneError::MissingRoot {
            frame: frame_id.to_string(),
            root: frame.root_node_id.clone(),
        });
    }

    // A component surface already counts as expanding its component
    let chain = match &frame.kind {
        FrameKind::Component {
            component_id: Some(component_id),
        } => vec![component_id.clone()],
        _ => Vec::new(),
    };

    let mut expansion = Expansion {
        document,
        frame_id,
        nodes: BTreeMap::new(),
        reserved: HashSet::new(),
        diagnostics: Vec::new(),
    };
    let scope = Scope {
        prefix: None,
        nodes: &document.nodes,
        chain,
        fill: None,
    };
    let root_id = expansion
        .expand(&frame.root_node_id, &scope, None)
        .unwrap_or_else(|| frame.root_node_id.clone());

    debug!(
        nodes = expansion.nodes.len(),
        diagnostics = expansion.diagnostics.len(),
        "Expanded frame"
    );

    Ok(ExpandedScene {
        frame_id: frame_id.to_string(),
        root_id,
        nodes: expansion.nodes,
        diagnostics: expansion.diagnostics,
    })
}

struct CachedScene {
    document: Arc<EditorDocument>,
    scene: Arc<ExpandedScene>,
}

/// Builds scenes and reuses the last one per frame while the document value
/// is unchanged (by identity).
#[derive(Default)]
pub struct SceneBuilder {
    cache: HashMap<String, CachedScene>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self, document: &Arc<EditorDocument>, frame_id: &str) -> Result<Arc<ExpandedScene>, SceneError> {
        if let Some(cached) = self.cache.get(frame_id) {
            if Arc::ptr_eq(&cached.document, document) {
                debug!(frame_id, "Reusing cached scene");
                return Ok(Arc::clone(&cached.scene));
            }
        }

        let scene = Arc::new(build_scene(document, frame_id)?);
        self.cache.insert(
            frame_id.to_string(),
            CachedScene {
                document: Arc::clone(document),
                scene: Arc::clone(&scene),
            },
        );
        Ok(scene)
    }

    pub fn invalidate(&mut self, frame_id: &str) {
        self.cache.remove(frame_id);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_frames(&self) -> usize {
        self.cache.len()
    }
}
