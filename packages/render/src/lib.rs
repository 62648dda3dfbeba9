pub mod compiler;
pub mod render_node;
pub mod sizing;


pub use compiler::{compile_scene, render_type, RenderCompiler};
pub use render_node::{KnownSize, RenderDocument, RenderNode, RenderType, RenderValue};
pub use sizing::fill_is_bounded;
