//! Protocol types for Faceguess's wire format.
//!
//! Every type here travels "on the wire": it is serialized into a JSON
//! text frame, sent over the socket, and parsed by the browser client.
//! Field names are camelCase because that is what the JavaScript side
//! reads; the `serde` attributes below do the renaming so the Rust code
//! can stay snake_case.

use std::fmt;

use faceguess_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The code players type in to join a room, e.g. `"482913"`.
///
/// A newtype around `String` so a room code can't be confused with a
/// player name. `#[serde(transparent)]` keeps it a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps a raw code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Records carried inside events
// ---------------------------------------------------------------------------

/// A player's guess for the current round.
///
/// Older clients call the category field `race`; `alias` accepts both
/// spellings on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    pub age: u32,
    #[serde(alias = "race")]
    pub category: String,
    pub gender: String,
}

/// A roster entry. Also used for leaderboard rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: ConnectionId,
    pub name: String,
    pub score: u32,
}

/// One player's scored guess for the current round, as shown to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub player_id: ConnectionId,
    pub player_name: String,
    pub age: u32,
    pub category: String,
    pub gender: String,
    pub points: u32,
    pub feedback: Vec<String>,
}

/// Payload of `gameStarted` and `nextQuestion`: which round is live and
/// which picture to show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundAnnouncement {
    pub current_round_index: usize,
    pub total_rounds: usize,
    pub avatar: String,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Client → server events.
///
/// `#[serde(tag = "event", content = "data")]` produces "adjacently
/// tagged" JSON, one object per frame:
///
/// ```text
/// { "event": "joinGame", "data": { "roomCode": "482913", "playerName": "Bob" } }
/// { "event": "startGame" }
/// ```
///
/// `rename_all` renames the variants (`JoinGame` → `"joinGame"`),
/// `rename_all_fields` renames the fields inside them
/// (`player_name` → `"playerName"`). Events without a payload are sent
/// with no `data` key at all.
///
/// There is no disconnect event; closing the socket is the disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Open a new room with the sender as host.
    CreateGame { host_name: String },

    /// Join an existing room as a player.
    JoinGame {
        room_code: RoomCode,
        player_name: String,
    },

    /// Host only: leave the lobby and open round 0.
    StartGame,

    /// Player only: guess the current round's item.
    SubmitAnswer(Guess),

    /// Host only: move to the next round (or finish after the last one).
    NextQuestion,

    /// Host only: finish the game now.
    EndGame,
}

/// Server → client events. Same framing as [`ClientEvent`].
///
/// Who receives each event is decided by the room, not by the event
/// itself: see [`Recipient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// To the creator: your room is open.
    GameCreated { room_code: RoomCode },

    /// To the originating connection only: the request was refused.
    Error { message: String },

    /// To the room: current roster in join order.
    PlayerList { players: Vec<Player>, count: usize },

    /// To the new player: you are in.
    JoinedGame {
        room_code: RoomCode,
        player_name: String,
    },

    /// To the room: the game has started.
    GameStarted(RoundAnnouncement),

    /// To the submitter: how the guess scored.
    AnswerResult { points: u32, feedback: Vec<String> },

    /// To the submitter: cumulative score after the guess.
    ScoreUpdate { score: u32 },

    /// To the host: every guess in for the current round.
    SubmissionsUpdate {
        submissions: Vec<Submission>,
        total_players: usize,
    },

    /// To the room: a new round is live.
    NextQuestion(RoundAnnouncement),

    /// To the room: final standings, best first.
    GameEnded { leaderboard: Vec<Player> },

    /// To the room: the host left and the room is gone.
    HostDisconnected { message: String },
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// The audience of a server event produced by a room.
///
/// Room operations return `(Recipient, ServerEvent)` pairs and the room
/// actor fans them out. Never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// The host and every player in the room.
    Room,

    /// The host only.
    Host,

    /// One specific connection.
    Connection(ConnectionId),
}

// =========================================================================
// Tests
// =========================================================================
