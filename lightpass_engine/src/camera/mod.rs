//! Camera module
//!
//! A passive data container for the per-frame view. The pipeline does
//! NOT store or drive cameras: the caller owns one, updates it from its
//! own input handling and hands it to [`Display::draw`](crate::scene::Display::draw).

mod camera;

pub use camera::Camera;
