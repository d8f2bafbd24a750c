//! # Faceguess
//!
//! Real-time multiplayer guessing game server.
//!
//! A host opens a room and shares its six-digit code; players join with a
//! display name. The host walks everyone through a fixed list of faces and
//! players guess each one's age, category, and gender for up to five
//! points a round. Everything is pushed over a WebSocket as JSON events.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use faceguess::prelude::*;
//!
//! # async fn start() -> Result<(), FaceguessError> {
//! let config = ServerConfig::from_env()?;
//! let server = ServerBuilder::from_config(&config)?.build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod gateway;
mod handler;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::FaceguessError;
pub use gateway::{Association, Gateway, Role};
pub use server::{FaceguessServer, ServerBuilder};

pub use faceguess_protocol as protocol;
pub use faceguess_room as room;
pub use faceguess_transport as transport;

pub mod prelude {
    pub use crate::{ConfigError, FaceguessError, FaceguessServer, ServerBuilder, ServerConfig};
    pub use faceguess_protocol::{ClientEvent, Guess, Player, RoomCode, ServerEvent};
    pub use faceguess_room::{Catalog, Item, RoomConfig, RoomError};
}
