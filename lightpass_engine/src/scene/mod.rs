//! Scene module
//!
//! Light data shared with the lit shaders and the [`Display`] that owns
//! every pass of the demo scene and renders it in a fixed order.

pub mod lights;
pub mod display;

pub use lights::*;
pub use display::*;
