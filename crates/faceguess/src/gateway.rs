//! Connection gateway: routes client events to the right room.
//!
//! The gateway owns the [`RoomRegistry`] and remembers which room each
//! connection belongs to and in which role. Every inbound event goes
//! through [`Gateway::handle`]; a refusal comes back as a [`RoomError`]
//! for the caller to report privately to the originating connection.

use std::collections::HashMap;

use faceguess_protocol::{ClientEvent, ConnectionId, RoomCode, ServerEvent};
use faceguess_room::{Action, ClientSender, LeaveOutcome, RoomError, RoomHandle, RoomRegistry};
use tokio::sync::Mutex;

/// The part a connection plays in its room. Fixed for the connection's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Player,
}

/// A connection's membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub room: RoomCode,
    pub role: Role,
    pub name: String,
}

pub struct Gateway {
    registry: Mutex<RoomRegistry>,
    associations: Mutex<HashMap<ConnectionId, Association>>,
}

impl Gateway {
    pub fn new(registry: RoomRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
            associations: Mutex::new(HashMap::new()),
        }
    }

    /// Dispatches one event from `conn`.
    ///
    /// `sender` is the connection's outbound channel; rooms keep a clone of
    /// it to deliver broadcasts.
    pub async fn handle(
        &self,
        conn: ConnectionId,
        sender: &ClientSender,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        match event {
            ClientEvent::CreateGame { host_name } => self.create(conn, sender, host_name).await,
            ClientEvent::JoinGame {
                room_code,
                player_name,
            } => self.join(conn, sender, room_code, player_name).await,
            ClientEvent::StartGame => self.act(conn, Action::Start).await,
            ClientEvent::SubmitAnswer(guess) => self.act(conn, Action::Submit(guess)).await,
            ClientEvent::NextQuestion => self.act(conn, Action::Advance).await,
            ClientEvent::EndGame => self.act(conn, Action::End).await,
        }
    }

    /// Removes `conn` from its room, closing the room if `conn` hosted it.
    ///
    /// Safe to call more than once and for connections that never joined.
    pub async fn disconnect(&self, conn: ConnectionId) {
        let Some(assoc) = self.associations.lock().await.remove(&conn) else {
            return;
        };
        let Some(handle) = self.registry.lock().await.get(&assoc.room) else {
            return;
        };

        match handle.leave(conn).await {
            Ok(LeaveOutcome::Left) => {
                tracing::debug!(%conn, room = %assoc.room, player = %assoc.name, "player disconnected");
            }
            Ok(LeaveOutcome::Closed) => self.close_room(&assoc.room).await,
            Err(e) => {
                tracing::debug!(%conn, room = %assoc.room, error = %e, "leave failed");
            }
        }
    }

    /// The room and role of `conn`, if it has created or joined one.
    pub async fn association(&self, conn: ConnectionId) -> Option<Association> {
        self.associations.lock().await.get(&conn).cloned()
    }

    /// Returns a handle to a live room.
    pub async fn room(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.registry.lock().await.get(code)
    }

    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.room_count()
    }

    async fn create(
        &self,
        conn: ConnectionId,
        sender: &ClientSender,
        host_name: String,
    ) -> Result<(), RoomError> {
        self.ensure_unassociated(conn).await?;

        let room = self
            .registry
            .lock()
            .await
            .create_room(conn, host_name.clone(), sender.clone())?;

        self.associations.lock().await.insert(
            conn,
            Association {
                room: room.clone(),
                role: Role::Host,
                name: host_name,
            },
        );
        let _ = sender.try_send(ServerEvent::GameCreated { room_code: room });
        Ok(())
    }

    async fn join(
        &self,
        conn: ConnectionId,
        sender: &ClientSender,
        room: RoomCode,
        name: String,
    ) -> Result<(), RoomError> {
        self.ensure_unassociated(conn).await?;

        let handle = self
            .room(&room)
            .await
            .ok_or_else(|| RoomError::RoomNotFound(room.clone()))?;
        handle.join(conn, name.clone(), sender.clone()).await?;

        self.associations.lock().await.insert(
            conn,
            Association {
                room,
                role: Role::Player,
                name,
            },
        );
        Ok(())
    }

    async fn act(&self, conn: ConnectionId, action: Action) -> Result<(), RoomError> {
        let room = self
            .association(conn)
            .await
            .map(|assoc| assoc.room)
            .ok_or(RoomError::NoActiveRoom)?;

        let Some(handle) = self.room(&room).await else {
            self.associations.lock().await.remove(&conn);
            return Err(RoomError::RoomNotFound(room));
        };
        handle.act(conn, action).await
    }

    /// Refuses a second create or join, forgetting memberships of rooms
    /// that have since closed.
    async fn ensure_unassociated(&self, conn: ConnectionId) -> Result<(), RoomError> {
        let Some(assoc) = self.association(conn).await else {
            return Ok(());
        };
        if self.room(&assoc.room).await.is_some() {
            return Err(RoomError::AlreadyInRoom(assoc.room));
        }
        self.associations.lock().await.remove(&conn);
        Ok(())
    }

    async fn close_room(&self, code: &RoomCode) {
        self.registry.lock().await.remove(code);
        let mut associations = self.associations.lock().await;
        let before = associations.len();
        associations.retain(|_, assoc| assoc.room != *code);
        tracing::info!(room = %code, released = before - associations.len(), "room closed");
    }
}
