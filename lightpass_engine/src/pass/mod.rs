//! Render passes built on top of render targets: shadow depth passes,
//! bloom blur and ambient occlusion

pub mod shadow;
pub mod gaussian_blur;
pub mod ssao;

pub use shadow::*;
pub use gaussian_blur::*;
pub use ssao::*;
