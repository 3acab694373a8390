//! Session module bridging the pure game engine to a timer-driven world.
//!
//! This module implements:
//! - SessionActor: async actor owning one game's state and timers
//! - SessionHandle: clonable command interface for a view layer
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each session runs in a single tokio task with an mpsc message inbox.
//! The actor is the only writer of the game state, so reads are never
//! torn and no locks exist anywhere. At most one deferred transition is
//! armed at a time; installing a new state replaces (and thereby
//! cancels) the previous timer, and dropping the actor cancels the last
//! one, so a timer can never fire into a stale or destroyed session.
//!
//! ## Example
//!
//! ```no_run
//! use pairmatch::game::ImageKey;
//! use pairmatch::session::{SessionActor, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let images: Vec<ImageKey> = ["cat.png", "dog.png", "owl.png"]
//!         .map(ImageKey::new)
//!         .to_vec();
//!     let (actor, handle) = SessionActor::new(&images, SessionConfig::default()).unwrap();
//!     tokio::spawn(actor.run());
//!
//!     handle.open_card(0).await.unwrap();
//!     let view = handle.view().await.unwrap();
//!     assert!(view.cards[0].is_opened);
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{SessionActor, SessionError, SessionHandle};
pub use config::SessionConfig;
pub use messages::{SessionMessage, SessionResponse, StateChangeNotification};
