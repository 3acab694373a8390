//! Session actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::game::entities::{CardId, GameView, ImageKey};
use crate::game::state_machine::GameError;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Reveal a card and hold it for comparison
    OpenCard {
        id: CardId,
        response: oneshot::Sender<SessionResponse>,
    },

    /// Discard the game and deal a fresh board from the given keys
    ResetGame {
        images: Vec<ImageKey>,
        response: oneshot::Sender<SessionResponse>,
    },

    /// Get a read-only snapshot of the game
    GetView {
        response: oneshot::Sender<GameView>,
    },

    /// Register for state change notifications
    Subscribe {
        sender: mpsc::Sender<StateChangeNotification>,
    },

    /// Shut the session down, cancelling any armed timer
    Close {
        response: oneshot::Sender<SessionResponse>,
    },
}

/// Outcome of a session command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionResponse {
    /// The command transitioned the game
    Applied,
    /// The command was a silent no-op (locked input, already-open card, ...)
    Ignored,
    /// The command carried an input the game rejects outright
    Rejected(GameError),
}

/// Notification sent to subscribers after a transition (for efficient
/// push-style view updates).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StateChangeNotification {
    /// The game state changed; pull a fresh view
    StateChanged,
    /// Every card is face-up; an automatic reshuffle is scheduled
    GameCompleted,
    /// The session shut down
    SessionClosed,
}
