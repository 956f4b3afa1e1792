// ============================================================================
// GPU MODULE — shader synthesis, texture upload, tile renderer
// ============================================================================

pub mod renderer;
pub mod shaders;
pub mod texture;

pub use renderer::{FrameParams, TileRenderer};
pub use texture::GpuTexture;
