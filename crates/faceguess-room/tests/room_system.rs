//! Integration tests for the registry and room actors.
//!
//! Each connection is simulated by a bounded channel; a room command's
//! reply arrives only after the room has fanned out its events, so the
//! receivers can be drained with `try_recv` straight after an `await`.

use std::collections::HashSet;

use faceguess_protocol::{ConnectionId, Guess, RoomCode, ServerEvent};
use faceguess_room::{
    Action, Catalog, ClientSender, LeaveOutcome, Phase, RoomConfig, RoomError, RoomRegistry,
};
use tokio::sync::mpsc::{self, Receiver};

// =========================================================================
// Helpers
// =========================================================================

fn conn(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn client() -> (ClientSender, Receiver<ServerEvent>) {
    mpsc::channel(64)
}

fn drain(rx: &mut Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn bob_guess() -> Guess {
    Guess {
        age: 57,
        category: "Ази".into(),
        gender: "Эрэгтэй".into(),
    }
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_create_rooms_yields_distinct_codes() {
    let mut registry = RoomRegistry::default();
    let mut codes = HashSet::new();
    for id in 0..200 {
        let code = registry
            .create_room(conn(id), format!("host{id}"), client().0)
            .unwrap();
        codes.insert(code);
    }
    assert_eq!(codes.len(), 200);
    assert_eq!(registry.room_count(), 200);

    let listed: HashSet<RoomCode> = registry.room_codes().into_iter().collect();
    assert_eq!(listed, codes);
    for code in &codes {
        assert_eq!(registry.get(code).unwrap().code(), code);
    }
}

#[tokio::test]
async fn test_unknown_code_is_absent() {
    let registry = RoomRegistry::default();
    assert!(registry.get(&RoomCode::new("000000")).is_none());
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let mut registry = RoomRegistry::default();
    let code = registry.create_room(conn(1), "Ann".into(), client().0).unwrap();
    assert!(registry.remove(&code).is_some());
    assert!(registry.remove(&code).is_none());
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_room_limit() {
    let mut registry = RoomRegistry::new(
        Catalog::default(),
        RoomConfig {
            max_rooms: 1,
            ..RoomConfig::default()
        },
    );
    registry.create_room(conn(1), "Ann".into(), client().0).unwrap();
    let err = registry
        .create_room(conn(2), "Eve".into(), client().0)
        .unwrap_err();
    assert_eq!(err, RoomError::ServerFull);
}

#[tokio::test]
async fn test_blank_host_name_is_refused() {
    let mut registry = RoomRegistry::default();
    let err = registry.create_room(conn(1), "  ".into(), client().0).unwrap_err();
    assert!(matches!(err, RoomError::InvalidName(_)));
    assert_eq!(registry.room_count(), 0);
}

// =========================================================================
// Room actor
// =========================================================================

#[tokio::test]
async fn test_join_fans_out_roster() {
    let mut registry = RoomRegistry::default();
    let (host_tx, mut host_rx) = client();
    let code = registry.create_room(conn(1), "Ann".into(), host_tx).unwrap();
    let room = registry.get(&code).unwrap();

    let (bob_tx, mut bob_rx) = client();
    room.join(conn(2), "Bob".into(), bob_tx).await.unwrap();

    let host_events = drain(&mut host_rx);
    assert!(matches!(
        &host_events[..],
        [ServerEvent::PlayerList { count: 1, .. }]
    ));

    let bob_events = drain(&mut bob_rx);
    assert_eq!(bob_events.len(), 2);
    assert!(matches!(&bob_events[0], ServerEvent::PlayerList { count: 1, .. }));
    assert_eq!(
        bob_events[1],
        ServerEvent::JoinedGame {
            room_code: code.clone(),
            player_name: "Bob".into(),
        }
    );
}

#[tokio::test]
async fn test_concurrent_joins_with_same_name() {
    let mut registry = RoomRegistry::default();
    let code = registry.create_room(conn(1), "Ann".into(), client().0).unwrap();
    let room = registry.get(&code).unwrap();

    let (a, b) = tokio::join!(
        room.join(conn(2), "Bob".into(), client().0),
        room.join(conn(3), "Bob".into(), client().0),
    );
    let ok = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(ok, 1, "exactly one join may win");
    assert_eq!(room.info().await.unwrap().player_count, 1);
}

#[tokio::test]
async fn test_non_host_transitions_are_refused() {
    let mut registry = RoomRegistry::default();
    let code = registry.create_room(conn(1), "Ann".into(), client().0).unwrap();
    let room = registry.get(&code).unwrap();
    let (bob_tx, mut bob_rx) = client();
    room.join(conn(2), "Bob".into(), bob_tx).await.unwrap();
    drain(&mut bob_rx);

    for action in [Action::Start, Action::Advance, Action::End] {
        let err = room.act(conn(2), action).await.unwrap_err();
        assert_eq!(err, RoomError::NotHost);
    }
    assert_eq!(room.info().await.unwrap().phase, Phase::Lobby);
    assert!(drain(&mut bob_rx).is_empty(), "refusals are not broadcast");
}

#[tokio::test]
async fn test_start_without_players() {
    let mut registry = RoomRegistry::default();
    let code = registry.create_room(conn(1), "Ann".into(), client().0).unwrap();
    let room = registry.get(&code).unwrap();
    assert_eq!(
        room.act(conn(1), Action::Start).await.unwrap_err(),
        RoomError::NoPlayers
    );
}

#[tokio::test]
async fn test_full_member_queue_does_not_stall_room() {
    let mut registry = RoomRegistry::default();
    let (host_tx, mut host_rx) = client();
    let code = registry.create_room(conn(1), "Ann".into(), host_tx).unwrap();
    let room = registry.get(&code).unwrap();

    // Bob's writer never drains and has room for a single event.
    let (bob_tx, mut bob_rx) = mpsc::channel(1);
    room.join(conn(2), "Bob".into(), bob_tx).await.unwrap();
    room.join(conn(3), "Cy".into(), client().0).await.unwrap();
    room.act(conn(1), Action::Start).await.unwrap();

    assert_eq!(drain(&mut bob_rx).len(), 1);
    let host_events = drain(&mut host_rx);
    assert!(matches!(host_events.last(), Some(ServerEvent::GameStarted(_))));
    assert_eq!(room.info().await.unwrap().phase, Phase::InRound);
}

#[tokio::test]
async fn test_host_leaving_closes_room() {
    let mut registry = RoomRegistry::default();
    let code = registry.create_room(conn(1), "Ann".into(), client().0).unwrap();
    let room = registry.get(&code).unwrap();
    let (bob_tx, mut bob_rx) = client();
    room.join(conn(2), "Bob".into(), bob_tx).await.unwrap();
    drain(&mut bob_rx);

    assert_eq!(room.leave(conn(1)).await.unwrap(), LeaveOutcome::Closed);
    assert!(matches!(
        &drain(&mut bob_rx)[..],
        [ServerEvent::HostDisconnected { .. }]
    ));

    // The actor is gone; the handle reports the room as missing.
    let err = room.info().await.unwrap_err();
    assert_eq!(err, RoomError::RoomNotFound(code.clone()));
    let err = room
        .join(conn(3), "Cy".into(), client().0)
        .await
        .unwrap_err();
    assert_eq!(err, RoomError::RoomNotFound(code));
}

#[tokio::test]
async fn test_player_leaving_mid_round() {
    let mut registry = RoomRegistry::default();
    let (host_tx, mut host_rx) = client();
    let code = registry.create_room(conn(1), "Ann".into(), host_tx).unwrap();
    let room = registry.get(&code).unwrap();

    let (bob_tx, mut bob_rx) = client();
    let (cy_tx, mut cy_rx) = client();
    room.join(conn(2), "Bob".into(), bob_tx).await.unwrap();
    room.join(conn(3), "Cy".into(), cy_tx).await.unwrap();
    room.act(conn(1), Action::Start).await.unwrap();
    room.act(conn(2), Action::Submit(bob_guess()))
        .await
        .unwrap();
    drain(&mut host_rx);
    drain(&mut bob_rx);
    drain(&mut cy_rx);

    assert_eq!(room.leave(conn(2)).await.unwrap(), LeaveOutcome::Left);

    let host_events = drain(&mut host_rx);
    assert_eq!(host_events.len(), 2);
    match &host_events[0] {
        ServerEvent::PlayerList { players, count } => {
            assert_eq!(*count, 1);
            assert_eq!(players[0].name, "Cy");
        }
        other => panic!("expected playerList, got {other:?}"),
    }
    assert!(matches!(
        &host_events[1],
        ServerEvent::SubmissionsUpdate { submissions, total_players: 1 } if submissions.is_empty()
    ));

    // Cy is unaffected and can still play.
    assert!(matches!(&drain(&mut cy_rx)[..], [ServerEvent::PlayerList { count: 1, .. }]));
    room.act(conn(3), Action::Submit(bob_guess()))
        .await
        .unwrap();
    // Bob no longer receives anything.
    assert!(drain(&mut bob_rx).is_empty());
}

#[tokio::test]
async fn test_bob_plays_a_full_game() {
    let mut registry = RoomRegistry::default();
    let (host_tx, mut host_rx) = client();
    let code = registry.create_room(conn(1), "A".into(), host_tx).unwrap();
    let room = registry.get(&code).unwrap();

    let (bob_tx, mut bob_rx) = client();
    room.join(conn(2), "Bob".into(), bob_tx).await.unwrap();
    room.act(conn(1), Action::Start).await.unwrap();
    drain(&mut bob_rx);
    drain(&mut host_rx);

    room.act(conn(2), Action::Submit(bob_guess()))
        .await
        .unwrap();
    let bob_events = drain(&mut bob_rx);
    assert!(matches!(bob_events[0], ServerEvent::AnswerResult { points: 5, .. }));
    assert_eq!(bob_events[1], ServerEvent::ScoreUpdate { score: 5 });
    assert!(matches!(
        &drain(&mut host_rx)[..],
        [ServerEvent::SubmissionsUpdate { total_players: 1, .. }]
    ));

    for _ in 0..10 {
        room.act(conn(1), Action::Advance).await.unwrap();
    }

    let info = room.info().await.unwrap();
    assert_eq!(info.phase, Phase::Ended);
    assert_eq!(info.current_round, 10);

    let last = drain(&mut bob_rx).pop().unwrap();
    match last {
        ServerEvent::GameEnded { leaderboard } => {
            assert_eq!(leaderboard.len(), 1);
            assert_eq!(leaderboard[0].name, "Bob");
            assert_eq!(leaderboard[0].score, 5);
        }
        other => panic!("expected gameEnded, got {other:?}"),
    }
    assert_eq!(
        room.act(conn(1), Action::Advance).await.unwrap_err(),
        RoomError::GameNotInProgress
    );
}
