//! Room lifecycle management for Faceguess.
//!
//! Each room runs as an isolated Tokio task (actor) that owns its game
//! state, roster, and the outbound senders of its members.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: allocates room codes, creates and removes rooms
//! - [`RoomHandle`]: sends commands to a running room actor
//! - [`Room`]: the synchronous game state machine inside each actor
//! - [`Catalog`]: the ordered items the rounds are played over
//! - [`score`]: the scoring rules

mod catalog;
mod config;
mod error;
mod game;
mod registry;
mod room;
mod scoring;

pub use catalog::{Catalog, Item};
pub use config::{CODE_SPACE, MAX_ROOMS_LIMIT, Phase, RoomConfig};
pub use error::{CatalogError, RoomError};
pub use game::{Departure, Outbox, Room};
pub use registry::RoomRegistry;
pub use room::{Action, ClientSender, LeaveOutcome, RoomHandle, RoomInfo};
pub use scoring::{MAX_POINTS, Score, score};
