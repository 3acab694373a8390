//! Value types for the matching game: cards, faces, the selection buffer,
//! and the read-only views handed to a presentation layer.

use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt};

use super::constants::CARDS_PER_COMPARISON;

/// Identifier of a card within a single session. Assigned sequentially at
/// shuffle time, so ids carry no information about faces.
pub type CardId = usize;

/// The face value printed on a card. Exactly two cards in a session share
/// a given key; the key is typically an image path or asset name.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ImageKey(String);

impl ImageKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ImageKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ImageKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for ImageKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A single card on the board.
///
/// Cards are plain values. A transition never mutates a card in place; it
/// builds a replacement with the flags it wants and a new board around it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub image: ImageKey,
    /// Face-up. Permanently true once the card has been matched.
    pub is_opened: bool,
    /// Held in the selection buffer, revealed but not yet compared.
    pub is_pending: bool,
}

impl Card {
    #[must_use]
    pub fn closed(id: CardId, image: ImageKey) -> Self {
        Self {
            id,
            image,
            is_opened: false,
            is_pending: false,
        }
    }

    /// True once the card has survived a comparison face-up.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.is_opened && !self.is_pending
    }
}

/// Ordered holding area for the cards currently chosen but not yet
/// resolved. Never holds more than [`CARDS_PER_COMPARISON`] ids.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SelectionBuffer(Vec<CardId>);

impl SelectionBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::with_capacity(CARDS_PER_COMPARISON))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.0.len() >= CARDS_PER_COMPARISON
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn ids(&self) -> &[CardId] {
        &self.0
    }

    /// Appends an id, refusing once the buffer is full. Returns whether the
    /// id was taken.
    pub fn push(&mut self, id: CardId) -> bool {
        if self.is_full() {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// A card as a presentation layer is allowed to see it.
///
/// The face of a closed card is withheld so a client cannot read the board
/// through the wire format; it is present exactly while the card is
/// face-up (matched or held for comparison).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub face: Option<ImageKey>,
    pub is_opened: bool,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            face: card.is_opened.then(|| card.image.clone()),
            is_opened: card.is_opened,
        }
    }
}

/// Read-only snapshot of a game, in board order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameView {
    pub cards: Vec<CardView>,
    /// True while a deferred comparison or reshuffle is owed; user input
    /// is ignored for the duration and a client should disable it.
    pub input_locked: bool,
    /// True once every card on the board is face-up.
    pub is_complete: bool,
    /// True until the first reshuffle. Clients use this to suppress the
    /// initial flip animation.
    pub first_round: bool,
}

impl GameView {
    #[must_use]
    pub fn opened_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_opened).count()
    }
}
