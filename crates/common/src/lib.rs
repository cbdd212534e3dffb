//! Shared types used across the anaglyph viewer crates.
//!
//! # Invariants
//! - Interocular distance is never negative.
//! - Stereo mode cycling wraps over exactly three modes.

mod types;

pub use types::{
    ColorMask, ParseStereoModeError, SceneInstance, StereoMode, StereoParameters, IPD_STEP,
};
