pub mod clipboard;
pub mod component;
pub mod document;
pub mod error;
pub mod frame;
pub mod id_generator;
pub mod layout;
pub mod node;
pub mod path;
pub mod style;
pub mod values;

pub use clipboard::{ClipboardError, ClipboardPayload};
pub use component::*;
pub use document::*;
pub use error::ModelError;
pub use frame::*;
pub use id_generator::*;
pub use layout::*;
pub use node::*;
pub use path::{PathError, PropPath, PropertyImpact};
pub use style::*;
pub use values::*;
