/// Render context module - shared GPU state handed to every component

pub mod bindings;
pub mod block_layout;
pub mod uniform_block;
pub mod transform;
pub mod render_context;

pub use block_layout::*;
pub use uniform_block::*;
pub use transform::*;
pub use render_context::*;
