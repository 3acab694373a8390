/// Integration tests for the session actor
///
/// Run under paused tokio time so the comparison and reshuffle windows
/// resolve deterministically without real sleeping.
use std::collections::HashMap;
use std::time::Duration;

use pairmatch::{
    CardId, GameError, ImageKey, SessionActor, SessionConfig, SessionHandle, SessionResponse,
    StateChangeNotification,
};

fn keys(names: &[&str]) -> Vec<ImageKey> {
    names.iter().map(|name| ImageKey::new(*name)).collect()
}

fn spawn_session(images: &[ImageKey]) -> SessionHandle {
    let (actor, handle) = SessionActor::seeded(images, SessionConfig::default(), 99).unwrap();
    tokio::spawn(actor.run());
    handle
}

/// Past the comparison window but short of the reshuffle window.
const AFTER_COMPARE: Duration = Duration::from_millis(550);
/// Past the reshuffle window.
const AFTER_RESET: Duration = Duration::from_millis(1050);

#[tokio::test(start_paused = true)]
async fn test_second_open_locks_until_comparison_resolves() {
    // A single pair always matches, so the outcome is deterministic.
    let handle = spawn_session(&keys(&["solo"]));

    assert_eq!(handle.open_card(0).await.unwrap(), SessionResponse::Applied);
    let view = handle.view().await.unwrap();
    assert!(!view.input_locked);
    assert!(view.cards[0].is_opened);

    assert_eq!(handle.open_card(1).await.unwrap(), SessionResponse::Applied);
    let view = handle.view().await.unwrap();
    assert!(view.input_locked);
    assert_eq!(view.opened_count(), 2);

    tokio::time::sleep(AFTER_COMPARE).await;
    let view = handle.view().await.unwrap();
    assert!(view.is_complete);
    // Completion owes a reshuffle, so input stays locked.
    assert!(view.input_locked);
}

#[tokio::test(start_paused = true)]
async fn test_completed_board_reshuffles_after_reset_window() {
    let handle = spawn_session(&keys(&["solo"]));

    handle.open_card(0).await.unwrap();
    handle.open_card(1).await.unwrap();
    tokio::time::sleep(AFTER_COMPARE).await;
    assert!(handle.view().await.unwrap().is_complete);

    tokio::time::sleep(AFTER_RESET).await;
    let view = handle.view().await.unwrap();
    assert_eq!(view.cards.len(), 2);
    assert_eq!(view.opened_count(), 0);
    assert!(!view.input_locked);
    assert!(!view.first_round);
}

#[tokio::test(start_paused = true)]
async fn test_commands_ignored_during_comparison_window() {
    let handle = spawn_session(&keys(&["a", "b"]));

    handle.open_card(0).await.unwrap();
    handle.open_card(1).await.unwrap();
    assert!(handle.view().await.unwrap().input_locked);

    assert_eq!(handle.open_card(2).await.unwrap(), SessionResponse::Ignored);
    assert_eq!(
        handle.reset_game(keys(&["a", "b"])).await.unwrap(),
        SessionResponse::Ignored
    );

    let view = handle.view().await.unwrap();
    assert!(!view.cards[2].is_opened);
    assert_eq!(view.opened_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reopening_same_card_is_ignored() {
    let handle = spawn_session(&keys(&["a", "b"]));

    assert_eq!(handle.open_card(3).await.unwrap(), SessionResponse::Applied);
    assert_eq!(handle.open_card(3).await.unwrap(), SessionResponse::Ignored);
    assert_eq!(
        handle.open_card(99).await.unwrap(),
        SessionResponse::Ignored
    );

    let view = handle.view().await.unwrap();
    assert_eq!(view.opened_count(), 1);
    assert!(!view.input_locked);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_reset_deals_a_fresh_board() {
    let handle = spawn_session(&keys(&["a", "b"]));

    handle.open_card(0).await.unwrap();
    assert_eq!(
        handle.reset_game(keys(&["x", "y", "z"])).await.unwrap(),
        SessionResponse::Applied
    );

    let view = handle.view().await.unwrap();
    assert_eq!(view.cards.len(), 6);
    assert_eq!(view.opened_count(), 0);
    assert!(!view.first_round);
}

#[tokio::test(start_paused = true)]
async fn test_reset_with_empty_image_set_is_rejected() {
    let handle = spawn_session(&keys(&["a"]));

    assert_eq!(
        handle.reset_game(Vec::new()).await.unwrap(),
        SessionResponse::Rejected(GameError::EmptyImageSet)
    );

    // The running game is untouched.
    let view = handle.view().await.unwrap();
    assert_eq!(view.cards.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_session_rejects_empty_image_set() {
    let result = SessionActor::new(&[], SessionConfig::default());
    assert!(matches!(result, Err(GameError::EmptyImageSet)));
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_observe_round_lifecycle() {
    let handle = spawn_session(&keys(&["solo"]));
    let mut notifications = handle.subscribe().await.unwrap();

    handle.open_card(0).await.unwrap();
    handle.open_card(1).await.unwrap();
    tokio::time::sleep(AFTER_COMPARE).await;

    assert_eq!(
        notifications.recv().await,
        Some(StateChangeNotification::StateChanged)
    );
    assert_eq!(
        notifications.recv().await,
        Some(StateChangeNotification::StateChanged)
    );
    // The comparison transition, then the completion marker.
    assert_eq!(
        notifications.recv().await,
        Some(StateChangeNotification::StateChanged)
    );
    assert_eq!(
        notifications.recv().await,
        Some(StateChangeNotification::GameCompleted)
    );
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_armed_timer_and_drops_handle() {
    let handle = spawn_session(&keys(&["a", "b"]));
    let mut notifications = handle.subscribe().await.unwrap();

    // Arm the comparison timer, then tear the session down before it fires.
    handle.open_card(0).await.unwrap();
    handle.open_card(1).await.unwrap();
    handle.close().await.unwrap();

    // Skip the two open-card notifications.
    notifications.recv().await.unwrap();
    notifications.recv().await.unwrap();
    assert_eq!(
        notifications.recv().await,
        Some(StateChangeNotification::SessionClosed)
    );
    assert_eq!(notifications.recv().await, None);

    assert!(handle.view().await.is_err());
}

/// A client that remembers every face it has seen can always finish a
/// game using only the session's public interface, because a face is
/// visible exactly while its card is open.
#[tokio::test(start_paused = true)]
async fn test_memorizing_client_completes_a_game() {
    let handle = spawn_session(&keys(&["a", "b", "c"]));
    let mut seen: HashMap<CardId, ImageKey> = HashMap::new();

    for _round in 0..32 {
        let view = handle.view().await.unwrap();
        if view.is_complete {
            return;
        }

        let closed: Vec<CardId> = view
            .cards
            .iter()
            .filter(|card| !card.is_opened)
            .map(|card| card.id)
            .collect();

        play_round(&handle, &closed, &mut seen).await;
        tokio::time::sleep(AFTER_COMPARE).await;
    }

    panic!("client failed to finish a three-pair game in 32 rounds");
}

/// Record the face of every currently-open card.
async fn remember(handle: &SessionHandle, seen: &mut HashMap<CardId, ImageKey>) {
    let view = handle.view().await.unwrap();
    for card in &view.cards {
        if let Some(face) = &card.face {
            seen.insert(card.id, face.clone());
        }
    }
}

/// Open two closed cards: a remembered pair when one exists, otherwise
/// explore unseen cards, using the second reveal's face if its partner
/// is already known.
async fn play_round(
    handle: &SessionHandle,
    closed: &[CardId],
    seen: &mut HashMap<CardId, ImageKey>,
) {
    // A pair whose faces are both already known.
    for (i, &a) in closed.iter().enumerate() {
        for &b in &closed[i + 1..] {
            if let (Some(face_a), Some(face_b)) = (seen.get(&a), seen.get(&b))
                && face_a == face_b
            {
                open(handle, a, seen).await;
                open(handle, b, seen).await;
                return;
            }
        }
    }

    // Explore: open an unseen card first, then either its remembered
    // partner or another unseen card.
    let first = closed
        .iter()
        .copied()
        .find(|id| !seen.contains_key(id))
        .unwrap_or(closed[0]);
    open(handle, first, seen).await;
    let face = seen[&first].clone();

    let second = closed
        .iter()
        .copied()
        .filter(|&id| id != first)
        .find(|id| seen.get(id) == Some(&face))
        .or_else(|| {
            closed
                .iter()
                .copied()
                .find(|&id| id != first && !seen.contains_key(&id))
        })
        .unwrap_or_else(|| {
            closed
                .iter()
                .copied()
                .find(|&id| id != first)
                .expect("a closed card always has a closed partner")
        });
    open(handle, second, seen).await;
}

async fn open(handle: &SessionHandle, id: CardId, seen: &mut HashMap<CardId, ImageKey>) {
    assert_eq!(handle.open_card(id).await.unwrap(), SessionResponse::Applied);
    remember(handle, seen).await;
}
