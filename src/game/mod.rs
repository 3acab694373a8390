//! Matching game engine - pure state machine and its value types.
//!
//! This module provides the rules of the game with no notion of time:
//! - Card, face, and selection-buffer entities
//! - The [`GameState`] reducer with its open/compare/reset transitions
//! - Read-only views for a presentation layer
//!
//! Timing (the reveal window before a comparison resolves, the pause
//! before a finished board reshuffles) lives in [`crate::session`].

pub mod constants;
pub mod entities;
pub mod state_machine;

pub use entities::{Card, CardId, CardView, GameView, ImageKey, SelectionBuffer};
pub use state_machine::{Action, GameError, GameState, PendingEvent};
