//! # Pairmatch
//!
//! A memory matching-pairs game engine built around a pure state machine.
//!
//! A board of face-down cards is revealed two at a time: a matched pair
//! stays open, a mismatch flips back after a short reveal window, and a
//! completed board reshuffles itself after a pause. All of the rules live
//! in an immutable reducer; all of the timing lives in a tokio actor that
//! drives the reducer.
//!
//! ## Architecture
//!
//! The game moves through three conceptual phases:
//!
//! - **Selecting**: cards may be revealed; the second reveal of a round
//!   locks input and owes a comparison
//! - **Comparing**: a deferred transition resolves the held pair after a
//!   reveal window
//! - **Complete**: every card is face-up; a deferred reshuffle starts the
//!   next round
//!
//! ## Core Modules
//!
//! - [`game`]: entities, the [`game::GameState`] reducer, and views
//! - [`session`]: the actor that owns a game's state and timers
//!
//! ## Example
//!
//! ```
//! use pairmatch::game::{GameState, ImageKey};
//!
//! let images = [ImageKey::new("cat.png"), ImageKey::new("dog.png")];
//! let state = GameState::new(&images).unwrap();
//! assert_eq!(state.cards.len(), 4);
//! ```

/// Core game rules, entities, and the state machine.
pub mod game;
pub use game::{
    Action, Card, CardId, CardView, GameError, GameState, GameView, ImageKey, PendingEvent,
    SelectionBuffer,
    constants::{self, CARDS_PER_COMPARISON},
};

/// Timer-driven session controller.
pub mod session;
pub use session::{
    SessionActor, SessionConfig, SessionError, SessionHandle, SessionResponse,
    StateChangeNotification,
};
