//! Whole-document structural check, for documents that did not arrive
//! through the applier (files on disk, imports, hand edits).

use crate::applier::RootOwner;
use crate::errors::PatchError;
use crate::parent_index::{subtree_ids, ParentIndex};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};
use vellum_common::{Diagnostic, DiagnosticCode, Location};
use vellum_model::path::validate_node;
use vellum_model::EditorDocument;

/// Every structural problem in `document`, errors first.
///
/// Nodes reachable from no frame or component root are reported as
/// warnings: the protocol allows detached nodes between batches.
#[instrument(skip_all, fields(document_id = %document.id, nodes = document.nodes.len()))]
pub fn check_document(document: &EditorDocument) -> Vec<Diagnostic> {
    let parents = ParentIndex::build(document);
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut report = |err: PatchError| diagnostics.push(err.to_diagnostic());

    let mut claimed: HashMap<&str, &str> = HashMap::new();
    for (key, node) in &document.nodes {
        if key != &node.id {
            report(PatchError::IdMismatch {
                target: key.clone(),
                found: node.id.clone(),
            });
        }
        if let Err(source) = validate_node(node) {
            report(PatchError::Path {
                target: node.id.clone(),
                source,
            });
        }
        for child_id in &node.child_ids {
            if !document.contains_node(child_id) {
                report(PatchError::DanglingNode {
                    parent: node.id.clone(),
                    child: child_id.clone(),
                });
                continue;
            }
            match claimed.get(child_id.as_str()) {
                Some(first) => report(PatchError::ChildAlreadyAttached {
                    child: child_id.clone(),
                    parent: first.to_string(),
                }),
                None => {
                    claimed.insert(child_id, &node.id);
                }
            }
        }
        if let Some(instance) = node.as_instance() {
            if document.component(&instance.component_id).is_none() {
                report(PatchError::DanglingComponent {
                    instance: node.id.clone(),
                    component: instance.component_id.clone(),
                });
            }
        }
        if parents.has_cycle_from(&node.id) {
            report(PatchError::CycleDetected {
                parent: parents.parent(&node.id).unwrap_or_default().to_string(),
                child: node.id.clone(),
            });
        }
    }

    let owners = document
        .frames
        .values()
        .map(|frame| (RootOwner::Frame(frame.id.as_str()), frame.root_node_id.as_str()))
        .chain(
            document
                .components
                .values()
                .map(|component| (RootOwner::Component(component.id.as_str()), component.root_node_id.as_str())),
        );
    let mut roots: HashMap<&str, RootOwner<'_>> = HashMap::new();
    for (owner, root_id) in owners {
        if !document.contains_node(root_id) {
            report(PatchError::MissingRoot {
                owner: owner.id().to_string(),
                root: root_id.to_string(),
            });
            continue;
        }
        if parents.parent(root_id).is_some() {
            report(PatchError::RootNotDetachable(root_id.to_string()));
        }
        if let Some(first) = roots.insert(root_id, owner) {
            report(PatchError::DuplicateRoot {
                root: root_id.to_string(),
                first: first.to_string(),
                second: owner.to_string(),
            });
        }
    }

    let reachable: HashSet<String> = document
        .frames
        .values()
        .map(|frame| frame.root_node_id.as_str())
        .chain(document.components.values().map(|component| component.root_node_id.as_str()))
        .flat_map(|root| subtree_ids(document, root))
        .collect();
    for id in document.nodes.keys() {
        if !reachable.contains(id) {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::DanglingNode,
                    format!("Node '{}' is not reachable from any frame or component", id),
                )
                .at(Location::node(id.clone())),
            );
        }
    }

    diagnostics.sort_by_key(|diagnostic| !diagnostic.is_error());
    debug!(found = diagnostics.len(), "Checked document structure");
    diagnostics
}
