//! Room registry: allocates room codes and tracks live rooms.

use std::collections::HashMap;

use faceguess_protocol::{ConnectionId, RoomCode};
use rand::Rng;

use crate::game::{Room, validate_name};
use crate::room::{ClientSender, RoomHandle, spawn_room};
use crate::{Catalog, MAX_ROOMS_LIMIT, RoomConfig, RoomError};

/// Lowest and highest six-digit room code.
const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// All live rooms, keyed by code.
///
/// Not thread-safe on its own: the gateway keeps it behind a mutex so code
/// allocation and insertion happen as one step.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    catalog: Catalog,
    config: RoomConfig,
}

impl RoomRegistry {
    /// Creates an empty registry. Every room plays `catalog`.
    ///
    /// `max_rooms` is capped at [`MAX_ROOMS_LIMIT`] and a zero
    /// `channel_size` is raised to 1.
    pub fn new(catalog: Catalog, mut config: RoomConfig) -> Self {
        config.max_rooms = config.max_rooms.min(MAX_ROOMS_LIMIT);
        config.channel_size = config.channel_size.max(1);
        Self {
            rooms: HashMap::new(),
            catalog,
            config,
        }
    }

    /// Opens a room hosted by `host` and spawns its actor.
    ///
    /// `sender` receives the host's events.
    pub fn create_room(
        &mut self,
        host: ConnectionId,
        host_name: String,
        sender: ClientSender,
    ) -> Result<RoomCode, RoomError> {
        validate_name(&host_name, self.config.max_name_len)?;
        if self.rooms.len() >= self.config.max_rooms {
            tracing::warn!(rooms = self.rooms.len(), "room limit reached");
            return Err(RoomError::ServerFull);
        }

        let code = self.generate_code();
        tracing::info!(room = %code, %host, host_name = %host_name, "room created");

        let room = Room::new(
            code.clone(),
            host,
            host_name,
            self.catalog.clone(),
            &self.config,
        );
        let handle = spawn_room(room, sender, self.config.channel_size);
        self.rooms.insert(code.clone(), handle);
        Ok(code)
    }

    /// Returns a handle to the room with `code`, if it is live.
    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).cloned()
    }

    /// Forgets the room with `code`. Removing an unknown code is a no-op.
    pub fn remove(&mut self, code: &RoomCode) -> Option<RoomHandle> {
        let handle = self.rooms.remove(code);
        if handle.is_some() {
            tracing::info!(room = %code, "room removed");
        }
        handle
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Draws six-digit codes until one is not in use.
    ///
    /// Terminates because `max_rooms` is capped well below the code space.
    fn generate_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code = RoomCode::new(rng.random_range(CODE_MIN..=CODE_MAX).to_string());
            if !self.rooms.contains_key(&code) {
                return code;
            }
            tracing::debug!(room = %code, "room code collision, redrawing");
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(Catalog::default(), RoomConfig::default())
    }
}
