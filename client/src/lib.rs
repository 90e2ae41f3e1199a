//! # Tether Client
//! Client-side replication engine for room-based, server-authoritative
//! multiplayer sessions. Connects over a pluggable transport, authorizes,
//! joins or creates a room, and keeps the room's replicated entities
//! synchronized through dirty-tracked delta frames.
//!
//! The engine is single-threaded and poll-driven: construct a [`Client`]
//! with a locked [`tether_shared::Protocol`] and a boxed transport, call
//! [`Client::update`] once per host tick, and consume the returned
//! [`ClientEvent`]s.

pub use tether_shared::{
    Authority, DeliveryMode, DisconnectReason, EntityId, EntityKinds, EntityLayout, EntityTypeId,
    EventCode, EventContainer, PeerId, Protocol, ProtocolPlugin, ReplicationMode, Serde, SizeMode,
    StaticId, Transport, TransportError, TransportEvent,
};

mod client;
mod entity;
mod error;
mod events;
mod room;
mod snapshot;

pub use client::{Client, ClientConfig, ConnectionStatus};
pub use entity::{Entity, EntityError};
pub use error::ClientError;
pub use events::{ClientEvent, Events};
pub use room::{Player, Room};
