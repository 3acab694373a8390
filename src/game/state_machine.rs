//! The turn-taking state machine for the matching game.
//!
//! [`GameState`] is an immutable value; every operation maps a state (and
//! an action) to a brand-new state, so a driver can hold snapshots without
//! worrying about aliased mutation. The conceptual machine is
//! `Selecting ⇄ Comparing → (Selecting | Complete) → Selecting` where the
//! comparison and the post-completion reshuffle are deferred, timer-driven
//! transitions owned by the session layer.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::CARDS_PER_COMPARISON;
use super::entities::{Card, CardId, CardView, GameView, ImageKey, SelectionBuffer};

/// Errors raised by the state machine.
///
/// `EmptyImageSet` is a rejected input. The other variants indicate a
/// broken driver: the selection buffer and card list can only disagree
/// with a comparison request if the caller skipped the machine's own
/// transitions. Drivers must treat those as fatal rather than continue
/// with a corrupt state.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("image set must contain at least one key")]
    EmptyImageSet,
    #[error("comparison requires exactly {expected} held cards, found {found}")]
    PendingSelectionMismatch { expected: usize, found: usize },
    #[error("invalid game state: held card {0} not on the board")]
    UnknownHeldCard(CardId),
}

/// A deferred transition owed to the current state.
///
/// While one of these is set, user input is ignored; the driver is
/// expected to fire the matching transition after its delay.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PendingEvent {
    /// Two cards are held; `compare_cards` is owed.
    Compare,
    /// Every card is face-up; a reshuffle is owed.
    Reset,
}

/// Actions accepted by the reducer, mirroring the commands a view layer
/// can issue plus the two deferred transitions.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    OpenCard(CardId),
    CompareCards,
    ResetGame(Vec<ImageKey>),
}

/// Full state of one matching game.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameState {
    /// The board, in display order. Each image key appears on exactly
    /// two cards.
    pub cards: Vec<Card>,
    selection: SelectionBuffer,
    pending_event: Option<PendingEvent>,
    first_round: bool,
}

impl GameState {
    /// Builds a fresh board from `images` using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyImageSet`] if `images` is empty. A zero
    /// card board would be trivially "complete" and immediately owe a
    /// reshuffle, so it is rejected outright.
    pub fn new(images: &[ImageKey]) -> Result<Self, GameError> {
        Self::with_rng(images, &mut rand::rng())
    }

    /// Builds a fresh board from `images`, shuffling with the provided
    /// RNG. Each key is duplicated, the combined set is uniformly
    /// permuted, and ids are assigned by board position.
    pub fn with_rng(images: &[ImageKey], rng: &mut impl Rng) -> Result<Self, GameError> {
        if images.is_empty() {
            return Err(GameError::EmptyImageSet);
        }

        let mut faces: Vec<ImageKey> = images.iter().chain(images.iter()).cloned().collect();
        faces.shuffle(rng);

        let cards = faces
            .into_iter()
            .enumerate()
            .map(|(id, image)| Card::closed(id, image))
            .collect();

        Ok(Self {
            cards,
            selection: SelectionBuffer::new(),
            pending_event: None,
            first_round: true,
        })
    }

    /// Reveals the card with `id` and holds it for comparison.
    ///
    /// A no-op (the returned state equals `self`) whenever the request
    /// cannot be honored: unknown id, card already face-up, selection
    /// buffer full, or a deferred transition pending. Rejected input is
    /// not an error; it keeps the view layer stateless about timing.
    #[must_use]
    pub fn open_card(&self, id: CardId) -> Self {
        if self.pending_event.is_some() || self.selection.is_full() {
            return self.clone();
        }
        let openable = self
            .cards
            .iter()
            .any(|card| card.id == id && !card.is_opened);
        if !openable {
            return self.clone();
        }

        let cards: Vec<Card> = self
            .cards
            .iter()
            .map(|card| {
                if card.id == id {
                    Card {
                        is_opened: true,
                        is_pending: true,
                        ..card.clone()
                    }
                } else {
                    card.clone()
                }
            })
            .collect();

        let mut selection = self.selection.clone();
        selection.push(id);
        let pending_event = selection.is_full().then_some(PendingEvent::Compare);

        Self {
            cards,
            selection,
            pending_event,
            first_round: self.first_round,
        }
    }

    /// Resolves the held pair: a mismatch closes both cards, a match
    /// leaves them face-up for good. The selection buffer is cleared and,
    /// if the board is now fully revealed, a reshuffle becomes owed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PendingSelectionMismatch`] unless exactly two
    /// cards are held. That only happens when a driver fires the
    /// comparison out of turn, which is a bug in the driver.
    pub fn compare_cards(&self) -> Result<Self, GameError> {
        let held = self.selection.ids();
        if held.len() != CARDS_PER_COMPARISON {
            return Err(GameError::PendingSelectionMismatch {
                expected: CARDS_PER_COMPARISON,
                found: held.len(),
            });
        }

        let first = self.card(held[0])?;
        let second = self.card(held[1])?;
        let matched = first.image == second.image;

        let cards: Vec<Card> = self
            .cards
            .iter()
            .map(|card| {
                if self.selection.contains(card.id) {
                    Card {
                        is_opened: matched,
                        is_pending: false,
                        ..card.clone()
                    }
                } else {
                    card.clone()
                }
            })
            .collect();

        let all_opened = cards.iter().all(|card| card.is_opened);
        let pending_event = all_opened.then_some(PendingEvent::Reset);

        Ok(Self {
            cards,
            selection: SelectionBuffer::new(),
            pending_event,
            first_round: self.first_round,
        })
    }

    /// Discards the game and deals a fresh shuffled board from `images`.
    /// The first-round marker is cleared so clients animate the flip.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyImageSet`] if `images` is empty.
    pub fn reset(&self, images: &[ImageKey], rng: &mut impl Rng) -> Result<Self, GameError> {
        let mut state = Self::with_rng(images, rng)?;
        state.first_round = false;
        Ok(state)
    }

    /// Reducer dispatch: applies `action` to `self`.
    ///
    /// # Errors
    ///
    /// Propagates the underlying operation's error.
    pub fn apply(&self, action: &Action, rng: &mut impl Rng) -> Result<Self, GameError> {
        match action {
            Action::OpenCard(id) => Ok(self.open_card(*id)),
            Action::CompareCards => self.compare_cards(),
            Action::ResetGame(images) => self.reset(images, rng),
        }
    }

    /// The deferred transition currently owed, if any.
    #[must_use]
    pub fn pending_event(&self) -> Option<PendingEvent> {
        self.pending_event
    }

    /// Ids currently held for comparison, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[CardId] {
        self.selection.ids()
    }

    /// True while a deferred transition is owed and user input is ignored.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.pending_event.is_some()
    }

    /// True once every card on the board is face-up.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cards.iter().all(|card| card.is_opened)
    }

    #[must_use]
    pub fn first_round(&self) -> bool {
        self.first_round
    }

    /// Snapshot for a presentation layer. Closed faces are withheld.
    #[must_use]
    pub fn view(&self) -> GameView {
        GameView {
            cards: self.cards.iter().map(CardView::from).collect(),
            input_locked: self.is_locked(),
            is_complete: self.is_complete(),
            first_round: self.first_round,
        }
    }

    fn card(&self, id: CardId) -> Result<&Card, GameError> {
        self.cards
            .iter()
            .find(|card| card.id == id)
            .ok_or(GameError::UnknownHeldCard(id))
    }
}
