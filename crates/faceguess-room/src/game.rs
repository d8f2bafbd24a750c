//! The per-room game state machine.
//!
//! [`Room`] is plain data plus synchronous transitions. It never touches a
//! channel: every operation returns the events it produced, each paired
//! with a [`Recipient`], and the room actor delivers them. That keeps the
//! rules testable without a runtime.

use faceguess_protocol::{
    ConnectionId, Guess, Player, Recipient, RoomCode, RoundAnnouncement, ServerEvent, Submission,
};

use crate::scoring::score;
use crate::{Catalog, Phase, RoomConfig, RoomError};

/// Events produced by one operation, in delivery order.
pub type Outbox = Vec<(Recipient, ServerEvent)>;

/// Result of a connection leaving the room.
#[derive(Debug)]
pub enum Departure {
    /// A player left; the room lives on.
    PlayerLeft(Outbox),
    /// The host left; the room must be torn down.
    RoomClosed(Outbox),
}

/// One game session.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    host_id: ConnectionId,
    host_name: String,
    /// Join order is preserved; it breaks leaderboard ties.
    players: Vec<Player>,
    phase: Phase,
    current_round: usize,
    submissions: Vec<Submission>,
    catalog: Catalog,
    max_name_len: usize,
}

impl Room {
    /// Creates a room in the lobby with no players.
    pub fn new(
        code: RoomCode,
        host_id: ConnectionId,
        host_name: String,
        catalog: Catalog,
        config: &RoomConfig,
    ) -> Self {
        Self {
            code,
            host_id,
            host_name,
            players: Vec::new(),
            phase: Phase::Lobby,
            current_round: 0,
            submissions: Vec::new(),
            catalog,
            max_name_len: config.max_name_len,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host_id(&self) -> ConnectionId {
        self.host_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the live round. Equals the catalog length once the last
    /// round has been passed.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn total_rounds(&self) -> usize {
        self.catalog.len()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Adds a player. Lobby only.
    pub fn join(&mut self, conn: ConnectionId, name: String) -> Result<Outbox, RoomError> {
        if conn == self.host_id || self.players.iter().any(|p| p.id == conn) {
            return Err(RoomError::AlreadyInRoom(self.code.clone()));
        }
        if !self.phase.is_joinable() {
            return Err(RoomError::GameAlreadyStarted);
        }
        validate_name(&name, self.max_name_len)?;
        if self.players.iter().any(|p| p.name == name) {
            return Err(RoomError::NameTaken(name));
        }

        self.players.push(Player {
            id: conn,
            name: name.clone(),
            score: 0,
        });
        tracing::info!(
            room = %self.code,
            %conn,
            player = %name,
            players = self.players.len(),
            "player joined"
        );

        Ok(vec![
            (Recipient::Room, self.player_list()),
            (
                Recipient::Connection(conn),
                ServerEvent::JoinedGame {
                    room_code: self.code.clone(),
                    player_name: name,
                },
            ),
        ])
    }

    /// Leaves the lobby and opens round 0. Host only.
    pub fn start(&mut self, requester: ConnectionId) -> Result<Outbox, RoomError> {
        self.require_host(requester)?;
        if self.phase != Phase::Lobby {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.players.is_empty() {
            return Err(RoomError::NoPlayers);
        }

        self.phase = Phase::InRound;
        self.current_round = 0;
        self.submissions.clear();
        tracing::info!(room = %self.code, players = self.players.len(), "game started");

        Ok(vec![(
            Recipient::Room,
            ServerEvent::GameStarted(self.announcement()),
        )])
    }

    /// Scores a player's guess for the live round.
    ///
    /// The host has no score; a guess from the host is dropped without an
    /// error. A second guess in the same round is refused.
    pub fn submit(&mut self, conn: ConnectionId, guess: Guess) -> Result<Outbox, RoomError> {
        if conn == self.host_id {
            tracing::debug!(room = %self.code, "ignoring guess from host");
            return Ok(Vec::new());
        }
        if self.phase != Phase::InRound {
            return Err(RoomError::GameNotInProgress);
        }
        let Some(item) = self.catalog.get(self.current_round) else {
            return Err(RoomError::GameNotInProgress);
        };
        if self.submissions.iter().any(|s| s.player_id == conn) {
            return Err(RoomError::AlreadySubmitted);
        }
        let Some(player) = self.players.iter_mut().find(|p| p.id == conn) else {
            return Err(RoomError::NoActiveRoom);
        };

        let result = score(&guess, item);
        player.score += result.points;
        let total = player.score;
        let player_name = player.name.clone();

        tracing::info!(
            room = %self.code,
            player = %player_name,
            round = self.current_round,
            points = result.points,
            "answer submitted"
        );

        self.submissions.push(Submission {
            player_id: conn,
            player_name,
            age: guess.age,
            category: guess.category,
            gender: guess.gender,
            points: result.points,
            feedback: result.feedback.clone(),
        });

        Ok(vec![
            (
                Recipient::Connection(conn),
                ServerEvent::AnswerResult {
                    points: result.points,
                    feedback: result.feedback,
                },
            ),
            (
                Recipient::Connection(conn),
                ServerEvent::ScoreUpdate { score: total },
            ),
            (Recipient::Host, self.submissions_update()),
        ])
    }

    /// Moves to the next round, or ends the game after the last one.
    /// Host only.
    pub fn advance(&mut self, requester: ConnectionId) -> Result<Outbox, RoomError> {
        self.require_host(requester)?;
        if self.phase != Phase::InRound {
            return Err(RoomError::GameNotInProgress);
        }

        self.current_round += 1;
        self.submissions.clear();

        if self.current_round >= self.catalog.len() {
            self.current_round = self.catalog.len();
            return Ok(self.finish("last round played"));
        }

        tracing::info!(room = %self.code, round = self.current_round, "next question");
        Ok(vec![(
            Recipient::Room,
            ServerEvent::NextQuestion(self.announcement()),
        )])
    }

    /// Ends the game immediately with the current standings. Host only,
    /// from the lobby or a live round.
    pub fn end(&mut self, requester: ConnectionId) -> Result<Outbox, RoomError> {
        self.require_host(requester)?;
        if self.phase == Phase::Ended {
            return Err(RoomError::GameNotInProgress);
        }
        self.submissions.clear();
        Ok(self.finish("ended by host"))
    }

    /// Removes a connection from the room.
    ///
    /// The host leaving closes the room for everyone.
    pub fn leave(&mut self, conn: ConnectionId) -> Result<Departure, RoomError> {
        if conn == self.host_id {
            tracing::info!(room = %self.code, host = %self.host_name, "host left, closing room");
            return Ok(Departure::RoomClosed(vec![(
                Recipient::Room,
                ServerEvent::HostDisconnected {
                    message: "The host disconnected, the game is over.".to_string(),
                },
            )]));
        }

        let Some(index) = self.players.iter().position(|p| p.id == conn) else {
            return Err(RoomError::NoActiveRoom);
        };
        let player = self.players.remove(index);
        self.submissions.retain(|s| s.player_id != conn);
        tracing::info!(
            room = %self.code,
            player = %player.name,
            players = self.players.len(),
            "player left"
        );

        let mut out = vec![(Recipient::Room, self.player_list())];
        if self.phase.has_started() {
            out.push((Recipient::Host, self.submissions_update()));
        }
        Ok(Departure::PlayerLeft(out))
    }

    /// Players by score, best first. Equal scores keep join order.
    pub fn leaderboard(&self) -> Vec<Player> {
        let mut board = self.players.clone();
        // `sort_by` is stable.
        board.sort_by(|a, b| b.score.cmp(&a.score));
        board
    }

    fn finish(&mut self, reason: &'static str) -> Outbox {
        self.phase = Phase::Ended;
        tracing::info!(room = %self.code, round = self.current_round, reason, "game ended");
        vec![(
            Recipient::Room,
            ServerEvent::GameEnded {
                leaderboard: self.leaderboard(),
            },
        )]
    }

    fn require_host(&self, requester: ConnectionId) -> Result<(), RoomError> {
        if requester == self.host_id {
            Ok(())
        } else {
            Err(RoomError::NotHost)
        }
    }

    fn player_list(&self) -> ServerEvent {
        ServerEvent::PlayerList {
            players: self.players.clone(),
            count: self.players.len(),
        }
    }

    fn submissions_update(&self) -> ServerEvent {
        ServerEvent::SubmissionsUpdate {
            submissions: self.submissions.clone(),
            total_players: self.players.len(),
        }
    }

    fn announcement(&self) -> RoundAnnouncement {
        RoundAnnouncement {
            current_round_index: self.current_round,
            total_rounds: self.catalog.len(),
            avatar: self
                .catalog
                .get(self.current_round)
                .map(|item| item.avatar.clone())
                .unwrap_or_default(),
        }
    }
}

/// Rejects blank names and names longer than `max_len` characters.
pub(crate) fn validate_name(name: &str, max_len: usize) -> Result<(), RoomError> {
    if name.trim().is_empty() {
        return Err(RoomError::InvalidName("name must not be blank".into()));
    }
    if name.chars().count() > max_len {
        return Err(RoomError::InvalidName(format!(
            "name must be at most {max_len} characters"
        )));
    }
    Ok(())
}
