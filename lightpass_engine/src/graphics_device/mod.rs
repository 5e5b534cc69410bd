/// Graphics device module - the immediate-mode GPU command surface

pub mod graphics_device;
pub mod buffer;
pub mod texture;
pub mod frame_buffer;

pub use graphics_device::*;
pub use buffer::*;
pub use texture::*;
pub use frame_buffer::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
