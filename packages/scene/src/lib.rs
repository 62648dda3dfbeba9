pub mod builder;
pub mod error;
pub mod expanded;
mod overrides;

#[cfg(test)]
mod tests_instances;

#[cfg(test)]
mod tests_slots;

pub use builder::{build_scene, SceneBuilder};
pub use error::SceneError;
pub use expanded::{namespaced, ExpandedNode, ExpandedProps, ExpandedScene, NAMESPACE_SEPARATOR};
