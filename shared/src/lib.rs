//! # Tether Shared
//! Wire-protocol vocabulary shared by every peer of a tether session: the
//! opcode table, id types, authority and replication policies, the transport
//! abstraction, and the entity-layout and event registries.

pub use tether_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

mod authority;
mod entity_layout;
mod error;
mod event_kinds;
mod opcode;
mod protocol;
mod replication;
mod transport;
mod types;

pub use authority::Authority;
pub use entity_layout::{EntityKinds, EntityLayout, PropertySpec, SizeMode};
pub use error::WireError;
pub use event_kinds::{EventContainer, EventError, EventKinds};
pub use opcode::Opcode;
pub use protocol::{Protocol, ProtocolPlugin};
pub use replication::ReplicationMode;
pub use transport::{
    DeliveryMode, DisconnectReason, Transport, TransportError, TransportEvent,
};
pub use types::{EntityId, EntityTypeId, EventCode, PeerId, StaticId};
