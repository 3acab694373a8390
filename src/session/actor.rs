//! Session actor implementation with async message handling.
//!
//! The actor bridges the pure game state machine to a time-driven
//! environment: it owns the current [`GameState`], applies commands from
//! its inbox, and fires the deferred transitions (comparison resolution,
//! post-completion reshuffle) that the state marks as owed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    time::{self, Instant},
};

use super::{
    config::SessionConfig,
    messages::{SessionMessage, SessionResponse, StateChangeNotification},
};
use crate::game::{
    entities::{CardId, GameView, ImageKey},
    state_machine::{GameError, GameState, PendingEvent},
};

/// Capacity of a subscriber's notification channel.
const SUBSCRIBER_CAPACITY: usize = 16;

/// Errors from talking to a session through its handle.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,
}

/// Session handle for sending commands
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    fn new(sender: mpsc::Sender<SessionMessage>) -> Self {
        Self { sender }
    }

    /// Reveal the card with `id` and hold it for comparison.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has shut down.
    pub async fn open_card(&self, id: CardId) -> Result<SessionResponse, SessionError> {
        let (response, receiver) = oneshot::channel();
        self.send(SessionMessage::OpenCard { id, response }).await?;
        receiver.await.map_err(|_| SessionError::Closed)
    }

    /// Discard the game and deal a fresh board from `images`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has shut down.
    pub async fn reset_game(
        &self,
        images: Vec<ImageKey>,
    ) -> Result<SessionResponse, SessionError> {
        let (response, receiver) = oneshot::channel();
        self.send(SessionMessage::ResetGame { images, response })
            .await?;
        receiver.await.map_err(|_| SessionError::Closed)
    }

    /// Snapshot of the game as a presentation layer may see it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has shut down.
    pub async fn view(&self) -> Result<GameView, SessionError> {
        let (response, receiver) = oneshot::channel();
        self.send(SessionMessage::GetView { response }).await?;
        receiver.await.map_err(|_| SessionError::Closed)
    }

    /// Register for state change notifications.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has shut down.
    pub async fn subscribe(
        &self,
    ) -> Result<mpsc::Receiver<StateChangeNotification>, SessionError> {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.send(SessionMessage::Subscribe { sender }).await?;
        Ok(receiver)
    }

    /// Shut the session down. Any armed timer is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session already shut down.
    pub async fn close(&self) -> Result<(), SessionError> {
        let (response, receiver) = oneshot::channel();
        self.send(SessionMessage::Close { response }).await?;
        receiver.await.map_err(|_| SessionError::Closed)?;
        Ok(())
    }

    async fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

/// A deferred transition with its armed deadline. Replacing this value
/// cancels the previous timer; dropping the actor cancels the last one.
#[derive(Clone, Copy, Debug)]
struct Deferred {
    event: PendingEvent,
    deadline: Instant,
}

/// Session actor managing a single matching game
pub struct SessionActor {
    /// Session configuration
    config: SessionConfig,

    /// Current game state (only ever replaced wholesale)
    state: GameState,

    /// Image keys used for automatic reshuffles
    images: Vec<ImageKey>,

    /// Shuffle source, OS-seeded unless the session was built for replay
    rng: StdRng,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// The one outstanding deferred transition, if any
    deferred: Option<Deferred>,

    /// Subscribers for state change notifications
    subscribers: Vec<mpsc::Sender<StateChangeNotification>>,

    /// Is session closed
    is_closed: bool,
}

impl SessionActor {
    /// Create a new session actor with an OS-seeded shuffle.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyImageSet`] if `images` is empty.
    pub fn new(
        images: &[ImageKey],
        config: SessionConfig,
    ) -> Result<(Self, SessionHandle), GameError> {
        Self::with_rng(images, config, StdRng::from_os_rng())
    }

    /// Create a session whose shuffles are fully determined by `seed`,
    /// for replays and tests.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyImageSet`] if `images` is empty.
    pub fn seeded(
        images: &[ImageKey],
        config: SessionConfig,
        seed: u64,
    ) -> Result<(Self, SessionHandle), GameError> {
        Self::with_rng(images, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        images: &[ImageKey],
        config: SessionConfig,
        mut rng: StdRng,
    ) -> Result<(Self, SessionHandle), GameError> {
        let state = GameState::with_rng(images, &mut rng)?;
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);

        let actor = Self {
            config,
            state,
            images: images.to_vec(),
            rng,
            inbox,
            deferred: None,
            subscribers: Vec::new(),
            is_closed: false,
        };

        Ok((actor, SessionHandle::new(sender)))
    }

    /// Run the session actor event loop
    pub async fn run(mut self) {
        log::info!(
            "session '{}' starting with {} cards",
            self.config.name,
            self.state.cards.len()
        );

        loop {
            // The guard keeps the branch disabled when nothing is armed;
            // the fallback instant is never slept on.
            let deadline = self
                .deferred
                .map_or_else(Instant::now, |deferred| deferred.deadline);

            tokio::select! {
                maybe_message = self.inbox.recv() => {
                    match maybe_message {
                        Some(message) => self.handle_message(message),
                        // All handles dropped
                        None => break,
                    }
                    if self.is_closed {
                        break;
                    }
                }

                () = time::sleep_until(deadline), if self.deferred.is_some() => {
                    self.fire_deferred();
                    if self.is_closed {
                        break;
                    }
                }
            }
        }

        self.notify(StateChangeNotification::SessionClosed);
        log::info!("session '{}' closed", self.config.name);
    }

    /// Handle a session message
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::OpenCard { id, response } => {
                let result = self.handle_open_card(id);
                let _ = response.send(result);
            }

            SessionMessage::ResetGame { images, response } => {
                let result = self.handle_reset(images);
                let _ = response.send(result);
            }

            SessionMessage::GetView { response } => {
                let _ = response.send(self.state.view());
            }

            SessionMessage::Subscribe { sender } => {
                self.subscribers.push(sender);
                log::debug!(
                    "session '{}': subscriber added ({} total)",
                    self.config.name,
                    self.subscribers.len()
                );
            }

            SessionMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(SessionResponse::Applied);
            }
        }
    }

    /// Handle an open-card command from a handle
    fn handle_open_card(&mut self, id: CardId) -> SessionResponse {
        // Input arriving inside a comparison or reshuffle window is
        // dropped, never queued.
        if self.state.is_locked() || self.state.is_complete() {
            log::debug!(
                "session '{}': open card {id} ignored while locked",
                self.config.name
            );
            return SessionResponse::Ignored;
        }

        let next = self.state.open_card(id);
        if next == self.state {
            log::debug!(
                "session '{}': open card {id} was a no-op",
                self.config.name
            );
            return SessionResponse::Ignored;
        }

        self.transition(next);
        SessionResponse::Applied
    }

    /// Handle an explicit reset command from a handle
    fn handle_reset(&mut self, images: Vec<ImageKey>) -> SessionResponse {
        if self.state.is_locked() {
            log::debug!(
                "session '{}': reset ignored while locked",
                self.config.name
            );
            return SessionResponse::Ignored;
        }

        match self.state.reset(&images, &mut self.rng) {
            Ok(next) => {
                self.images = images;
                self.transition(next);
                SessionResponse::Applied
            }
            Err(error) => {
                log::warn!("session '{}': reset rejected: {error}", self.config.name);
                SessionResponse::Rejected(error)
            }
        }
    }

    /// Install a new state, re-derive the deferred transition, and notify
    /// subscribers.
    fn transition(&mut self, next: GameState) {
        self.state = next;
        self.arm_deferred();
        self.notify(StateChangeNotification::StateChanged);
        if self.state.is_complete() {
            self.notify(StateChangeNotification::GameCompleted);
        }
    }

    /// Derive the armed deadline from the current state's pending event.
    /// Replacing `self.deferred` cancels whatever was armed before, so a
    /// superseded timer can never fire.
    fn arm_deferred(&mut self) {
        self.deferred = self.state.pending_event().map(|event| {
            let delay = match event {
                PendingEvent::Compare => self.config.compare_delay(),
                PendingEvent::Reset => self.config.reset_delay(),
            };
            Deferred {
                event,
                deadline: Instant::now() + delay,
            }
        });
    }

    /// Fire the armed deferred transition.
    fn fire_deferred(&mut self) {
        let Some(deferred) = self.deferred.take() else {
            return;
        };

        match deferred.event {
            PendingEvent::Compare => match self.state.compare_cards() {
                Ok(next) => {
                    log::debug!("session '{}': comparison resolved", self.config.name);
                    self.transition(next);
                }
                Err(error) => self.fail(&error),
            },

            PendingEvent::Reset => {
                log::info!(
                    "session '{}': board complete, reshuffling",
                    self.config.name
                );
                match self.state.reset(&self.images, &mut self.rng) {
                    Ok(next) => self.transition(next),
                    Err(error) => self.fail(&error),
                }
            }
        }
    }

    /// An invariant violation out of the actor's own deferred transition
    /// means the session would keep running on a corrupt state. Shut it
    /// down instead and let the supervising layer observe the closure.
    fn fail(&mut self, error: &GameError) {
        log::error!("session '{}': fatal: {error}", self.config.name);
        self.is_closed = true;
    }

    /// Broadcast a notification to all subscribers, pruning closed ones
    fn notify(&mut self, notification: StateChangeNotification) {
        let name = &self.config.name;
        self.subscribers.retain(|sender| {
            match sender.try_send(notification.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("session '{name}': subscriber channel full, dropping notification");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }
}
