use std::vec::IntoIter;

use tether_shared::{DisconnectReason, EntityId, EventContainer, PeerId};

/// Everything the engine can notify the application about, as one tagged
/// variant consumed from a single subscriber loop.
#[derive(Debug)]
pub enum ClientEvent {
    /// The transport handshake completed
    Connected,
    /// The connection closed; Room and entity state have been torn down
    Disconnected(DisconnectReason),
    /// Authorization succeeded; carries the assigned stable player id and
    /// display name
    Authorized { player_id: String, name: String },
    /// A join or create request was acknowledged and the room snapshot has
    /// fully applied; the Room is populated when this is observed
    JoinedRoom,
    /// A join or create request was refused; the client remains authorized
    JoinFailed { message: String },
    /// The local player left the room, voluntarily or by server decision
    LeftRoom,
    /// A remote player entered the roster
    PlayerJoined {
        peer_id: PeerId,
        player_id: String,
        name: String,
    },
    /// A remote player left the roster
    PlayerLeft { peer_id: PeerId, player_id: String },
    /// The room owner designation moved to another player
    RoomOwnershipChanged { owner_id: String },
    /// An entity entered the room's entity table; carries the spawn payload
    EntityCreated { id: EntityId, payload: Vec<u8> },
    /// An entity left the entity table; carries the destroy payload
    EntityDestroyed { id: EntityId, payload: Vec<u8> },
    /// A state-replication frame was applied to an entity
    EntityStateUpdated { id: EntityId },
    /// A room-scoped replicated event
    Event {
        sender: PeerId,
        event: EventContainer,
    },
    /// An entity-scoped replicated event
    EntityEvent {
        sender: PeerId,
        entity_id: EntityId,
        event: EventContainer,
    },
    /// The server asked for a scene change; the entity table has been
    /// cleared. Reply with `Client::scene_loaded` once ready.
    SceneLoadRequested { scene: String },
    /// Reconnection restore completed; the acknowledgment has been sent
    Restored,
}

/// The notifications drained from one `update` call
#[derive(Default)]
pub struct Events {
    incoming: Vec<ClientEvent>,
}

impl Events {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }

    pub fn len(&self) -> usize {
        self.incoming.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClientEvent> {
        self.incoming.iter()
    }

    pub(crate) fn push(&mut self, event: ClientEvent) {
        self.incoming.push(event);
    }

    pub(crate) fn take(&mut self) -> Events {
        std::mem::take(self)
    }
}

impl IntoIterator for Events {
    type Item = ClientEvent;
    type IntoIter = IntoIter<ClientEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.incoming.into_iter()
    }
}
