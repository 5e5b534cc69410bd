/// Resource module - GPU-resident meshes, textures and programs

pub mod image_decoder;
pub mod shader;
pub mod object;
pub mod textures;
pub mod geometry;
pub mod model;

pub use image_decoder::*;
pub use shader::*;
pub use object::*;
pub use textures::*;
pub use geometry::*;
pub use model::*;
