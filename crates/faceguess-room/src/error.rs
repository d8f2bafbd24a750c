//! Error types for the room layer.

use std::path::PathBuf;

use faceguess_protocol::RoomCode;

/// Errors a room operation can be refused with.
///
/// All of them are recoverable and user-facing: the gateway turns the
/// `Display` text into a private `error` event and the room is left as it
/// was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The room has left the lobby.
    #[error("the game has already started")]
    GameAlreadyStarted,

    /// Another player in the room already uses this name.
    #[error("the name {0:?} is already taken")]
    NameTaken(String),

    /// A host-only operation was sent by someone else.
    #[error("only the host can do that")]
    NotHost,

    /// The host tried to start with an empty roster.
    #[error("there are no players in the room")]
    NoPlayers,

    /// The connection has not created or joined a room.
    #[error("you are not in a room")]
    NoActiveRoom,

    /// The connection already belongs to a room.
    #[error("you are already in room {0}")]
    AlreadyInRoom(RoomCode),

    /// A second guess for the same round.
    #[error("you have already answered this round")]
    AlreadySubmitted,

    /// Submitting, advancing, or ending outside of a running game.
    #[error("no game is in progress")]
    GameNotInProgress,

    /// Blank or overlong display name.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The live-room cap is reached.
    #[error("the server is full, try again later")]
    ServerFull,
}

/// Errors loading the item catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("cannot read item catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not a JSON array of items.
    #[error("invalid item catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// A game needs at least one round.
    #[error("item catalog is empty")]
    Empty,
}
