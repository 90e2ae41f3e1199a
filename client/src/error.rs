use thiserror::Error;

use tether_shared::{
    EntityId, EntityTypeId, EventError, SerdeErr, TransportError, WireError,
};

use crate::client::ConnectionStatus;
use crate::entity::EntityError;

/// Errors returned across the library boundary
#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation is not valid in the current connection state
    #[error("operation requires status {required:?}, current status is {current:?}")]
    InvalidStatus {
        required: ConnectionStatus,
        current: ConnectionStatus,
    },

    /// The operation requires a joined room
    #[error("no room is currently joined")]
    NoRoom,

    /// The room exists but its snapshot has not applied yet, so the local
    /// peer id is still unknown
    #[error("the room snapshot has not been applied yet")]
    RoomNotReady,

    /// The referenced entity is not in the room's entity table
    #[error("unknown entity {id}")]
    UnknownEntity { id: EntityId },

    /// The entity type was never registered with the protocol
    #[error("entity type {type_id} has no registered layout")]
    UnregisteredEntityType { type_id: EntityTypeId },

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Serde(#[from] SerdeErr),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Wire(#[from] WireError),
}
