//! Wire protocol for Faceguess.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Events** ([`ClientEvent`], [`ServerEvent`]): one per socket frame,
//!   named the way browser clients name them (`createGame`, `playerList`, ...).
//! - **Records** ([`Player`], [`Submission`], [`Guess`]): the data carried
//!   inside events.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about rooms or sockets; it only shapes
//! and (de)serializes messages.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Gateway → Room actors
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use faceguess_transport::ConnectionId;
pub use types::{
    ClientEvent, Guess, Player, Recipient, RoomCode, RoundAnnouncement, ServerEvent, Submission,
};
