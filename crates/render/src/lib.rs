//! Rendering core: camera state, stereo projection, and anaglyph compositing.
//!
//! Nothing here touches a GPU. Backends implement [`FrameTarget`] and
//! [`MeshProvider`]; [`RecordingBackend`] is a headless one for tests and tooling.
//!
//! # Invariants
//! - Eye frames are derived from camera and stereo state, never stored.
//! - Stereo frames write the left eye to red only and the right eye to green
//!   and blue only.
//! - The compositor never mutates camera, stereo, or scene state.

pub mod camera;
pub mod compositor;
pub mod renderer;
pub mod stereo;

pub use camera::{OrbitCamera, ORBIT_NUDGE, ORBIT_SPEED};
pub use compositor::{ClearBuffers, FrameTarget, MeshProvider, composite};
pub use renderer::{DebugTextRenderer, EyePass, FramePlan, RecordingBackend, RenderOp};
pub use stereo::{EyeFrame, EyeFrames, eye_frames, frustum_rh};

use thiserror::Error;

/// Fatal graphics setup failures. Nothing fails once rendering has started.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    Surface(String),
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("failed to create graphics device: {0}")]
    Device(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

pub fn crate_info() -> &'static str {
    "anaglyph-render v0.1.0"
}
