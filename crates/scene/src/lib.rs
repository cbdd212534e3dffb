//! Scene Generator: the list of box transforms drawn every frame.
//!
//! # Invariants
//! - Regeneration replaces the instance list wholesale.
//! - A single-box scene is deterministic; random scenes are reproducible per seed.

pub mod scene;

pub use scene::{Scene, DEFAULT_SEED, MANY_BOXES};
