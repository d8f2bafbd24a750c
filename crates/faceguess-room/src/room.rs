//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Every operation on a room is a [`RoomCommand`] on the actor's channel,
//! so joins, guesses, and round changes for the same room never
//! interleave. The actor also owns the outbound senders of everyone in the
//! room and fans out the events the state machine produces.

use std::collections::HashMap;

use faceguess_protocol::{ConnectionId, Guess, Recipient, RoomCode, ServerEvent};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::game::{Departure, Outbox, Room};
use crate::{Phase, RoomError};

/// Channel sender for delivering events to one connection's writer task.
///
/// Bounded: the room never waits on it, and a member whose queue is full
/// misses events until its writer catches up or gives up.
pub type ClientSender = mpsc::Sender<ServerEvent>;

/// A game action from a member of the room.
#[derive(Debug, Clone)]
pub enum Action {
    Start,
    Submit(Guess),
    Advance,
    End,
}

/// What happened when a connection left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// A player left and the room is still open.
    Left,
    /// The host left; the actor has stopped.
    Closed,
}

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a command and waits for the result on it.
pub(crate) enum RoomCommand {
    Join {
        conn: ConnectionId,
        name: String,
        sender: ClientSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Act {
        conn: ConnectionId,
        action: Action,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<LeaveOutcome, RoomError>>,
    },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: Phase,
    pub player_count: usize,
    pub current_round: usize,
    pub total_rounds: usize,
}

/// Handle to a running room actor.
///
/// Cheap to clone. Once the actor has stopped every call fails with
/// [`RoomError::RoomNotFound`].
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Asks the room to add `conn` as a player named `name`.
    ///
    /// On success `sender` receives the room's broadcasts from now on.
    pub async fn join(
        &self,
        conn: ConnectionId,
        name: String,
        sender: ClientSender,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(
            RoomCommand::Join {
                conn,
                name,
                sender,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Runs a game action on behalf of `conn`.
    pub async fn act(&self, conn: ConnectionId, action: Action) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Act { conn, action, reply }, rx)
            .await?
    }

    /// Removes `conn` from the room.
    pub async fn leave(&self, conn: ConnectionId) -> Result<LeaveOutcome, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Leave { conn, reply }, rx).await?
    }

    /// Requests a metadata snapshot.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::GetInfo { reply }, rx).await
    }

    async fn request<T>(
        &self,
        cmd: RoomCommand,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::RoomNotFound(self.code.clone()))?;
        rx.await
            .map_err(|_| RoomError::RoomNotFound(self.code.clone()))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    /// Outbound senders for the host and every player.
    senders: HashMap<ConnectionId, ClientSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Processes commands until the host leaves or every handle is dropped.
    async fn run(mut self) {
        let code = self.room.code().clone();
        tracing::debug!(room = %code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(conn, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Act { conn, action, reply } => {
                    let result = self.handle_action(conn, action);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { conn, reply } => {
                    let result = self.handle_leave(conn);
                    let closed = matches!(result, Ok(LeaveOutcome::Closed));
                    let _ = reply.send(result);
                    if closed {
                        break;
                    }
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
            }
        }

        tracing::debug!(room = %code, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        name: String,
        sender: ClientSender,
    ) -> Result<(), RoomError> {
        let out = self.room.join(conn, name)?;
        // Register first so the new player sees its own roster broadcast.
        self.senders.insert(conn, sender);
        self.dispatch(out);
        Ok(())
    }

    fn handle_action(&mut self, conn: ConnectionId, action: Action) -> Result<(), RoomError> {
        let out = match action {
            Action::Start => self.room.start(conn),
            Action::Submit(guess) => self.room.submit(conn, guess),
            Action::Advance => self.room.advance(conn),
            Action::End => self.room.end(conn),
        }
        .inspect_err(|e| {
            tracing::debug!(room = %self.room.code(), %conn, error = %e, "action refused");
        })?;
        self.dispatch(out);
        Ok(())
    }

    fn handle_leave(&mut self, conn: ConnectionId) -> Result<LeaveOutcome, RoomError> {
        let departure = self.room.leave(conn)?;
        self.senders.remove(&conn);
        match departure {
            Departure::PlayerLeft(out) => {
                self.dispatch(out);
                Ok(LeaveOutcome::Left)
            }
            Departure::RoomClosed(out) => {
                self.dispatch(out);
                self.senders.clear();
                Ok(LeaveOutcome::Closed)
            }
        }
    }

    /// Delivers events to their recipients.
    fn dispatch(&self, out: Outbox) {
        for (recipient, event) in out {
            match recipient {
                Recipient::Room => {
                    for (&conn, sender) in &self.senders {
                        self.deliver(conn, sender, event.clone());
                    }
                }
                Recipient::Host => self.send_to(self.room.host_id(), event),
                Recipient::Connection(conn) => self.send_to(conn, event),
            }
        }
    }

    fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&conn) {
            self.deliver(conn, sender, event);
        }
    }

    /// Queues `event` without waiting. Drops it if the writer is gone or
    /// its queue is full.
    fn deliver(&self, conn: ConnectionId, sender: &ClientSender, event: ServerEvent) {
        if let Err(TrySendError::Full(_)) = sender.try_send(event) {
            tracing::warn!(room = %self.room.code(), %conn, "outbound queue full, event dropped");
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.room.code().clone(),
            phase: self.room.phase(),
            player_count: self.room.players().len(),
            current_round: self.room.current_round(),
            total_rounds: self.room.total_rounds(),
        }
    }
}

/// Spawns the actor for `room` and returns a handle to it.
///
/// `host_sender` receives the host's events. `channel_size` bounds the
/// command queue and must be at least 1; senders wait when it is full.
pub(crate) fn spawn_room(room: Room, host_sender: ClientSender, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let code = room.code().clone();

    let mut senders = HashMap::new();
    senders.insert(room.host_id(), host_sender);

    let actor = RoomActor {
        room,
        senders,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
