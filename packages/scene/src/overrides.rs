//! Applies component parameter defaults and instance overrides onto the cloned
//! component subtree, using the same path resolution as `SetProp`.

use crate::builder::NodeMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use vellum_common::{Diagnostic, DiagnosticCode, Location};
use vellum_model::path::set_node_prop;
use vellum_model::{ComponentDef, InstanceProps, PropPath};

/// Apply defaults first, then overrides in key order. Every failure is
/// reported and skipped; the remaining overrides still apply.
pub(crate) fn apply_overrides(
    component: &ComponentDef,
    instance: &InstanceProps,
    instance_id: &str,
    clones: &mut NodeMap,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for param in &component.params {
        if param.default.is_null() {
            continue;
        }
        if let Err(reason) = set_local(clones, &param.binding.node_id, &param.binding.path, param.default.clone()) {
            diagnostics.push(invalid(instance_id, &param.key, &reason));
        }
    }

    for (key, value) in &instance.overrides {
        let result = if key.starts_with('/') {
            apply_pointer(clones, key, value.clone())
        } else {
            apply_param(component, clones, key, value.clone())
        };
        if let Err(reason) = result {
            diagnostics.push(invalid(instance_id, key, &reason));
        }
    }

    diagnostics
}

/// `/<localNodeId>/<property path>`
fn apply_pointer(clones: &mut NodeMap, key: &str, value: Value) -> Result<(), String> {
    let pointer = PropPath::parse(key).map_err(|e| e.to_string())?;
    let (local_id, rest) = pointer
        .split_first()
        .ok_or_else(|| "override pointer is empty".to_string())?;
    let path = rest.map_err(|_| format!("override '{}' has no property path", key))?;
    set_local(clones, local_id, path.as_str(), value)
}

fn apply_param(component: &ComponentDef, clones: &mut NodeMap, key: &str, value: Value) -> Result<(), String> {
    let param = component
        .param(key)
        .ok_or_else(|| format!("component '{}' has no parameter '{}'", component.id, key))?;
    if !param.param_type.accepts(&value) {
        return Err(format!("parameter '{}' expects a {:?} value", key, param.param_type));
    }
    set_local(clones, &param.binding.node_id, &param.binding.path, value)
}

fn set_local(clones: &mut NodeMap, local_id: &str, path: &str, value: Value) -> Result<(), String> {
    let path = PropPath::parse(path).map_err(|e| e.to_string())?;
    let node = clones
        .get_mut(local_id)
        .ok_or_else(|| format!("component has no node '{}'", local_id))?;
    set_node_prop(Arc::make_mut(node), &path, value)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn invalid(instance_id: &str, key: &str, reason: &str) -> Diagnostic {
    warn!(instance = instance_id, key, reason, "Skipping invalid override");
    Diagnostic::warning(
        DiagnosticCode::InvalidOverride,
        format!("Override '{}' on '{}' was skipped: {}", key, instance_id, reason),
    )
    .at(Location::node(instance_id).with_path(key))
}
