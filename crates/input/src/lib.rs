//! Input Handler: semantic actions mapped onto explicit application state.
//!
//! # Invariants
//! - State changes only between frames, through [`AppState::apply`] and
//!   [`AppState::update`].
//! - Actions are independent of any windowing library's key codes.

pub mod action;
pub mod state;

pub use action::Action;
pub use state::{AppConfig, AppState, Control};
