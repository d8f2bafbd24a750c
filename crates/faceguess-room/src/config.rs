//! Room configuration and lifecycle phases.

/// Number of distinct six-digit room codes (`100000..=999999`).
pub const CODE_SPACE: usize = 900_000;

/// Largest accepted `max_rooms`. Keeping the live rooms under half the
/// code space keeps rejection sampling to a couple of draws.
pub const MAX_ROOMS_LIMIT: usize = CODE_SPACE / 2;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Registry and room tuning.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Maximum number of live rooms. Capped at [`MAX_ROOMS_LIMIT`].
    pub max_rooms: usize,

    /// Maximum display-name length, in characters.
    pub max_name_len: usize,

    /// Command channel capacity of each room actor.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_rooms: 10_000,
            max_name_len: 32,
            channel_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a room is in its game.
///
/// ```text
/// Lobby → InRound → Ended
/// ```
///
/// - **Lobby**: accepting players; the host has not started yet.
/// - **InRound**: a round is live and players may submit guesses.
/// - **Ended**: the last round was passed or the host ended the game.
///   The room stays alive until the host disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    InRound,
    Ended,
}

impl Phase {
    /// Returns `true` if players may still join.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` once the host has started the game.
    pub fn has_started(self) -> bool {
        !matches!(self, Self::Lobby)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InRound => write!(f, "InRound"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
