//! wgpu render backend for the anaglyph viewer.
//!
//! Draws instanced boxes and realizes the compositor's clears and color masks
//! as render passes and per-mask pipelines.
//!
//! # Invariants
//! - Renderer never mutates camera, stereo, or scene state.
//! - A depth-only clear starts a pass that loads the existing color.

mod context;
mod gpu;
mod mesh;
mod shaders;

pub use context::GpuContext;
pub use gpu::WgpuRenderer;
