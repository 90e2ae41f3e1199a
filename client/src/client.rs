use std::collections::HashMap;

use log::warn;

use tether_shared::{
    Authority, ByteReader, ByteWriter, DeliveryMode, DisconnectReason, EntityId, EntityTypeId,
    Opcode, Protocol, ReplicationMode, Serde, SerdeErr, StaticId, Transport, TransportEvent,
};

use crate::entity::{Entity, EntityError};
use crate::error::ClientError;
use crate::events::{ClientEvent, Events};
use crate::room::{Player, Room};
use crate::snapshot::apply_snapshot;

/// Tunables for the client's polling loop
pub struct ClientConfig {
    /// Upper bound on inbound frames applied per [`Client::update`] call.
    /// Frames over the bound stay queued in the transport until the next
    /// tick, bounding per-tick work under backlog.
    pub max_frames_per_update: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_frames_per_update: 128,
        }
    }
}

/// Connection lifecycle of the dispatcher
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Authorized,
    InRoom,
}

/// The replication engine's dispatcher: owns the transport, the current
/// room if any, and the locked protocol; routes every received frame by its
/// opcode and drives the periodic delta-replication tick.
///
/// Single-threaded by design: all state mutation happens inside
/// [`Client::update`] or direct application calls, both assumed to occur on
/// the same logical thread. `update` must be invoked once per host tick and
/// never blocks, panics, or propagates protocol faults across the polling
/// boundary.
pub struct Client {
    config: ClientConfig,
    protocol: Protocol,
    transport: Box<dyn Transport>,
    status: ConnectionStatus,
    local_player_id: Option<String>,
    local_name: Option<String>,
    room: Option<Room>,
    statics: HashMap<StaticId, EntityTypeId>,
    events: Events,
}

impl Client {
    pub fn new(protocol: Protocol, transport: Box<dyn Transport>) -> Self {
        Self::with_config(ClientConfig::default(), protocol, transport)
    }

    pub fn with_config(
        config: ClientConfig,
        mut protocol: Protocol,
        transport: Box<dyn Transport>,
    ) -> Self {
        if !protocol.is_locked() {
            protocol.lock();
        }
        Self {
            config,
            protocol,
            transport,
            status: ConnectionStatus::Disconnected,
            local_player_id: None,
            local_name: None,
            room: None,
            statics: HashMap::new(),
            events: Events::new(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    pub fn room_mut(&mut self) -> Option<&mut Room> {
        self.room.as_mut()
    }

    /// The stable player id assigned at authorization
    pub fn local_player_id(&self) -> Option<&str> {
        self.local_player_id.as_deref()
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    // Connection lifecycle

    pub fn connect(
        &mut self,
        address: &str,
        port: u16,
        protocol_id: u32,
    ) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::Disconnected)?;
        self.transport.connect(address, port, protocol_id)?;
        self.status = ConnectionStatus::Connecting;
        Ok(())
    }

    /// Immediately transition to Disconnected and tear down all Room and
    /// entity state. Any in-flight request with no acknowledgment yet
    /// simply never materializes.
    pub fn disconnect(&mut self) {
        if self.status == ConnectionStatus::Disconnected {
            return;
        }
        self.transport.disconnect();
        self.teardown(DisconnectReason::Requested);
    }

    /// Drive one tick: poll the transport, apply a bounded number of
    /// inbound frames, run the delta-replication tick, and return the
    /// notifications produced along the way.
    pub fn update(&mut self) -> Events {
        self.transport.update();

        let mut frames = 0;
        while frames < self.config.max_frames_per_update {
            let Some(event) = self.transport.poll_event() else {
                break;
            };
            match event {
                TransportEvent::Connected => {
                    if self.status == ConnectionStatus::Connecting {
                        self.status = ConnectionStatus::Connected;
                        self.events.push(ClientEvent::Connected);
                    } else {
                        warn!("transport connected while in status {:?}", self.status);
                    }
                }
                TransportEvent::Disconnected(reason) => {
                    if self.status != ConnectionStatus::Disconnected {
                        self.teardown(reason);
                    }
                }
                TransportEvent::Data(payload) => {
                    frames += 1;
                    self.process_frame(&payload);
                }
            }
        }

        self.replication_tick();
        self.events.take()
    }

    // Authorization and room membership

    pub fn authorize(
        &mut self,
        key: &str,
        name: &str,
        protocol_version: u8,
        extra: &[u8],
    ) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::Connected)?;
        let mut writer = ByteWriter::new();
        writer.write_op(Opcode::Authorize.value())?;
        writer.write_string(key)?;
        writer.write_string(name)?;
        writer.write_byte(protocol_version)?;
        write_payload(&mut writer, extra)?;
        self.send_reliable(&writer)
    }

    pub fn create_or_join_room(
        &mut self,
        map: &str,
        min_players: u16,
        max_players: u16,
    ) -> Result<(), ClientError> {
        self.send_room_request(Opcode::JoinOrCreateRoom, map, min_players, max_players)
    }

    pub fn create_room(
        &mut self,
        map: &str,
        min_players: u16,
        max_players: u16,
    ) -> Result<(), ClientError> {
        self.send_room_request(Opcode::CreateRoom, map, min_players, max_players)
    }

    pub fn join_room(&mut self, room_id: &str) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::Authorized)?;
        let mut writer = ByteWriter::new();
        writer.write_op(Opcode::JoinRoom.value())?;
        writer.write_string(room_id)?;
        self.send_reliable(&writer)
    }

    pub fn leave_room(&mut self) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::InRoom)?;
        let mut writer = ByteWriter::new();
        writer.write_op(Opcode::LeaveRoom.value())?;
        self.send_reliable(&writer)?;

        self.room = None;
        self.status = ConnectionStatus::Authorized;
        self.events.push(ClientEvent::LeftRoom);
        Ok(())
    }

    fn send_room_request(
        &mut self,
        opcode: Opcode,
        map: &str,
        min_players: u16,
        max_players: u16,
    ) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::Authorized)?;
        let mut writer = ByteWriter::new();
        writer.write_op(opcode.value())?;
        writer.write_string(map)?;
        writer.write_u16(min_players)?;
        writer.write_u16(max_players)?;
        self.send_reliable(&writer)
    }

    // Entity lifecycle

    /// Request entity creation. The server assigns the id; the local entity
    /// materializes only when the corresponding creation notification
    /// arrives, never synchronously.
    pub fn create_entity(
        &mut self,
        type_id: EntityTypeId,
        spawn_payload: &[u8],
        state_authority: Authority,
        event_authority: Authority,
    ) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::InRoom)?;
        if self.protocol.entity_kinds.layout(type_id).is_none() {
            return Err(ClientError::UnregisteredEntityType { type_id });
        }
        let mut writer = ByteWriter::new();
        writer.write_op(Opcode::CreateEntity.value())?;
        writer.write_u16(type_id)?;
        writer.write_byte(state_authority.to_byte())?;
        writer.write_byte(event_authority.to_byte())?;
        write_payload(&mut writer, spawn_payload)?;
        self.send_reliable(&writer)
    }

    pub fn destroy_entity(&mut self, id: EntityId, payload: &[u8]) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::InRoom)?;
        let room = self.room.as_ref().ok_or(ClientError::NoRoom)?;
        if room.entity(id).is_none() {
            return Err(ClientError::UnknownEntity { id });
        }
        let mut writer = ByteWriter::new();
        writer.write_op(Opcode::DestroyEntity.value())?;
        writer.write_i32(id)?;
        write_payload(&mut writer, payload)?;
        self.send_reliable(&writer)
    }

    /// Declare a pre-placed entity in the local content, matched by the
    /// server-assigned static id during snapshot and static-create decode
    pub fn register_static_entity(
        &mut self,
        static_id: StaticId,
        type_id: EntityTypeId,
    ) -> Result<(), ClientError> {
        if self.protocol.entity_kinds.layout(type_id).is_none() {
            return Err(ClientError::UnregisteredEntityType { type_id });
        }
        if self.statics.contains_key(&static_id) {
            warn!("static entity {static_id} is already registered, ignoring duplicate");
            return Ok(());
        }
        self.statics.insert(static_id, type_id);
        Ok(())
    }

    // Event replication

    pub fn replicate_event<T: Serde + 'static>(
        &mut self,
        event: &T,
        mode: ReplicationMode,
    ) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::InRoom)?;
        let local_peer = self
            .room
            .as_ref()
            .and_then(Room::local_peer)
            .ok_or(ClientError::RoomNotReady)?;
        let code = self.protocol.event_kinds.code_of::<T>()?;

        let mut payload = ByteWriter::new();
        event.ser(&mut payload)?;

        if mode != ReplicationMode::ServerOnly {
            let mut reader = ByteReader::new(payload.as_slice());
            let container = self.protocol.event_kinds.decode(code, &mut reader)?;
            self.events.push(ClientEvent::Event {
                sender: local_peer,
                event: container,
            });
        }
        if mode != ReplicationMode::LocalOnly {
            let mut writer = ByteWriter::new();
            writer.write_op(Opcode::ReplicateEvent.value())?;
            writer.write_u16(local_peer)?;
            writer.write_byte(mode.to_byte())?;
            writer.write_u16(code)?;
            writer.write_data(payload.as_slice())?;
            self.send_reliable(&writer)?;
        }
        Ok(())
    }

    pub fn replicate_entity_event<T: Serde + 'static>(
        &mut self,
        entity_id: EntityId,
        event: &T,
        mode: ReplicationMode,
    ) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::InRoom)?;
        let local_peer = self
            .room
            .as_ref()
            .and_then(Room::local_peer)
            .ok_or(ClientError::RoomNotReady)?;
        {
            let room = self.room.as_ref().ok_or(ClientError::NoRoom)?;
            let entity = room
                .entity(entity_id)
                .ok_or(ClientError::UnknownEntity { id: entity_id })?;
            if !entity.has_event_authority() {
                return Err(ClientError::Entity(EntityError::NotAuthorized {
                    id: entity_id,
                    owner: entity.owner_peer(),
                }));
            }
        }
        let code = self.protocol.event_kinds.code_of::<T>()?;

        let mut payload = ByteWriter::new();
        event.ser(&mut payload)?;

        if mode != ReplicationMode::ServerOnly {
            let mut reader = ByteReader::new(payload.as_slice());
            let container = self.protocol.event_kinds.decode(code, &mut reader)?;
            self.events.push(ClientEvent::EntityEvent {
                sender: local_peer,
                entity_id,
                event: container,
            });
        }
        if mode != ReplicationMode::LocalOnly {
            let mut writer = ByteWriter::new();
            writer.write_op(Opcode::ReplicateEntityEvent.value())?;
            writer.write_u16(code)?;
            writer.write_u16(local_peer)?;
            writer.write_byte(mode.to_byte())?;
            writer.write_i32(entity_id)?;
            writer.write_data(payload.as_slice())?;
            self.send_reliable(&writer)?;
        }
        Ok(())
    }

    /// One-shot manual full-state push for immediate corrections, outside
    /// the automatic delta loop. Sent reliably, unlike the per-tick deltas.
    pub fn replicate_entity_state(&mut self, id: EntityId) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::InRoom)?;
        let room = self.room.as_mut().ok_or(ClientError::NoRoom)?;
        let entity = room
            .entity_mut(id)
            .ok_or(ClientError::UnknownEntity { id })?;
        if !entity.has_state_authority() {
            return Err(ClientError::Entity(EntityError::NotAuthorized {
                id,
                owner: entity.owner_peer(),
            }));
        }

        let mut writer = ByteWriter::new();
        writer.write_op(Opcode::ReplicateEntityState.value())?;
        writer.write_i32(id)?;
        entity.write_full_state(&mut writer)?;
        self.transport
            .send(writer.as_slice(), DeliveryMode::ReliableOrdered)?;
        Ok(())
    }

    /// Acknowledge a scene-load request once the host application's scene
    /// content is ready
    pub fn scene_loaded(&mut self) -> Result<(), ClientError> {
        self.require_status(ConnectionStatus::InRoom)?;
        let mut writer = ByteWriter::new();
        writer.write_op(Opcode::SceneIsLoaded.value())?;
        self.send_reliable(&writer)
    }

    // Internals

    fn require_status(&self, required: ConnectionStatus) -> Result<(), ClientError> {
        if self.status != required {
            return Err(ClientError::InvalidStatus {
                required,
                current: self.status,
            });
        }
        Ok(())
    }

    fn send_reliable(&mut self, writer: &ByteWriter) -> Result<(), ClientError> {
        self.transport
            .send(writer.as_slice(), DeliveryMode::ReliableOrdered)?;
        Ok(())
    }

    fn teardown(&mut self, reason: DisconnectReason) {
        self.room = None;
        self.local_player_id = None;
        self.local_name = None;
        self.status = ConnectionStatus::Disconnected;
        self.events.push(ClientEvent::Disconnected(reason));
    }

    /// Encode and send one state frame per dirty locally-owned entity
    fn replication_tick(&mut self) {
        let Some(room) = self.room.as_mut() else {
            return;
        };
        for id in room.dirty_owned_entities() {
            let Some(entity) = room.entity_mut(id) else {
                continue;
            };
            let mut writer = ByteWriter::new();
            let encoded = writer
                .write_op(Opcode::ReplicateEntityState.value())
                .and_then(|_| writer.write_i32(id))
                .and_then(|_| entity.write_state(&mut writer));
            match encoded {
                Ok(()) => {
                    if let Err(err) = self
                        .transport
                        .send(writer.as_slice(), DeliveryMode::Unreliable)
                    {
                        warn!("failed to replicate entity {id} state: {err}");
                    }
                }
                Err(err) => warn!("failed to encode entity {id} state: {err}"),
            }
        }
    }

    // Inbound dispatch

    fn process_frame(&mut self, payload: &[u8]) {
        let mut reader = ByteReader::new(payload);
        let raw = match reader.read_op() {
            Ok(raw) => raw,
            Err(err) => {
                warn!("discarding frame with malformed header: {err}");
                return;
            }
        };
        let opcode = match Opcode::try_from(raw) {
            Ok(opcode) => opcode,
            Err(err) => {
                warn!("discarding frame: {err}");
                return;
            }
        };

        let result = match opcode {
            Opcode::AuthorizedSuccess => self.on_authorized_success(&mut reader),
            Opcode::JoinSuccess => self.on_join_success(&mut reader),
            Opcode::JoinFailed => self.on_join_failed(&mut reader),
            Opcode::LeaveRoom => self.on_leave_room(),
            Opcode::PlayerJoined => self.on_player_joined(&mut reader),
            Opcode::PlayerLeft => self.on_player_left(&mut reader),
            Opcode::OwnershipChanged => self.on_ownership_changed(&mut reader),
            Opcode::CreateEntity => self.on_create_entity(&mut reader, false),
            Opcode::CreateStaticEntity => self.on_create_entity(&mut reader, true),
            Opcode::DestroyEntity => self.on_destroy_entity(&mut reader),
            Opcode::ReplicateEntityState => self.on_replicate_entity_state(&mut reader),
            Opcode::ReplicateEvent => self.on_replicate_event(&mut reader),
            Opcode::ReplicateEntityEvent => self.on_replicate_entity_event(&mut reader),
            Opcode::LoadScene => self.on_load_scene(&mut reader),
            Opcode::Snapshot => self.on_snapshot(&mut reader),
            Opcode::RestoreEnd => self.on_restore_end(),
            Opcode::Authorize
            | Opcode::JoinOrCreateRoom
            | Opcode::CreateRoom
            | Opcode::JoinRoom
            | Opcode::SceneIsLoaded
            | Opcode::Restored => {
                warn!("received client-to-server opcode {opcode:?}, discarding");
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!("error handling {opcode:?} frame: {err}");
        }
    }

    fn on_authorized_success(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let player_id = reader.read_string()?;
        let name = reader.read_string()?;

        if self.status != ConnectionStatus::Connected {
            warn!("authorization acknowledged while in status {:?}", self.status);
        }
        self.status = ConnectionStatus::Authorized;
        self.local_player_id = Some(player_id.clone());
        self.local_name = Some(name.clone());
        self.events.push(ClientEvent::Authorized { player_id, name });
        Ok(())
    }

    fn on_join_success(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let room_id = reader.read_string()?;
        let owner_id = reader.read_string()?;
        let local_id = reader.read_string()?;
        let min_players = reader.read_u16()?;
        let max_players = reader.read_u16()?;

        if self.status != ConnectionStatus::Authorized {
            warn!("join acknowledged while in status {:?}", self.status);
        }
        self.room = Some(Room::new(
            room_id,
            owner_id,
            local_id,
            min_players,
            max_players,
        ));
        self.status = ConnectionStatus::InRoom;
        // the joined notification waits for the snapshot, so listeners
        // observe a fully-populated room
        Ok(())
    }

    fn on_join_failed(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let message = reader.read_string()?;
        self.events.push(ClientEvent::JoinFailed { message });
        Ok(())
    }

    fn on_leave_room(&mut self) -> Result<(), ClientError> {
        if self.room.take().is_none() {
            warn!("leave notification without a room, discarding");
            return Ok(());
        }
        self.status = ConnectionStatus::Authorized;
        self.events.push(ClientEvent::LeftRoom);
        Ok(())
    }

    fn on_player_joined(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let peer_id = reader.read_u16()?;
        let player_id = reader.read_string()?;
        let name = reader.read_string()?;

        let Some(room) = self.room.as_mut() else {
            warn!("player-joined notification without a room, discarding");
            return Ok(());
        };
        room.add_player(Player::new(peer_id, player_id.clone(), name.clone()));
        self.events.push(ClientEvent::PlayerJoined {
            peer_id,
            player_id,
            name,
        });
        Ok(())
    }

    fn on_player_left(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let peer_id = reader.read_u16()?;
        let player_id = reader.read_string()?;
        let destroy_count = reader.read_u16()?;
        let mut destroyed = Vec::with_capacity(destroy_count as usize);
        for _ in 0..destroy_count {
            destroyed.push(reader.read_i32()?);
        }

        let Some(room) = self.room.as_mut() else {
            warn!("player-left notification without a room, discarding");
            return Ok(());
        };

        // server-enumerated force-destroys first
        for id in destroyed {
            if room.remove_entity(id).is_some() {
                self.events.push(ClientEvent::EntityDestroyed {
                    id,
                    payload: Vec::new(),
                });
            } else {
                warn!("player-left frame destroys unknown entity {id}");
            }
        }

        room.remove_player(peer_id);

        // surviving entities of the departed player migrate to the room
        // owner, so no entity is left owned by a peer outside the roster
        let survivors = room.entities_owned_by(peer_id);
        if !survivors.is_empty() {
            if let Some(owner_peer) = room.owner().map(Player::peer_id) {
                for id in survivors {
                    room.change_entity_owner(id, owner_peer);
                }
            } else {
                warn!("cannot migrate entities of departed peer {peer_id}: owner not in roster");
            }
        }

        self.events.push(ClientEvent::PlayerLeft { peer_id, player_id });
        Ok(())
    }

    fn on_ownership_changed(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let owner_id = reader.read_string()?;

        let Some(room) = self.room.as_mut() else {
            warn!("ownership-changed notification without a room, discarding");
            return Ok(());
        };
        if room.player_by_stable_id(&owner_id).is_none() {
            warn!("new room owner {owner_id} is not in the roster");
        }
        room.set_owner_id(owner_id.clone());
        self.events
            .push(ClientEvent::RoomOwnershipChanged { owner_id });
        Ok(())
    }

    fn on_create_entity(
        &mut self,
        reader: &mut ByteReader,
        is_static: bool,
    ) -> Result<(), ClientError> {
        let type_id = reader.read_u16()?;
        let static_id = if is_static {
            Some(reader.read_u16()?)
        } else {
            None
        };
        let state_authority = Authority::try_from(reader.read_byte()?)?;
        let event_authority = Authority::try_from(reader.read_byte()?)?;
        let entity_id = reader.read_i32()?;
        let owner_peer = reader.read_u16()?;
        let payload_length = reader.read_u16()? as usize;
        let payload = reader.read_data(payload_length)?.to_vec();

        let Some(room) = self.room.as_mut() else {
            warn!("entity creation without a room, discarding");
            return Ok(());
        };
        let Some(local_peer) = room.local_peer() else {
            warn!("entity {entity_id} created before the snapshot applied, skipping");
            return Ok(());
        };
        let Some(layout) = self.protocol.entity_kinds.layout(type_id) else {
            warn!("entity {entity_id} has unregistered type {type_id}, skipping");
            return Ok(());
        };
        if room.player(owner_peer).is_none() {
            warn!("entity {entity_id} owned by unknown peer {owner_peer}, skipping");
            return Ok(());
        }
        if let Some(static_id) = static_id {
            match self.statics.get(&static_id) {
                None => {
                    warn!("static entity {static_id} has no local registration, skipping");
                    return Ok(());
                }
                Some(registered) if *registered != type_id => {
                    warn!(
                        "static entity {static_id} is type {type_id}, registered locally as {registered}, skipping"
                    );
                    return Ok(());
                }
                Some(_) => {}
            }
        }

        room.add_entity(Entity::new(
            entity_id,
            layout.clone(),
            owner_peer,
            local_peer,
            state_authority,
            event_authority,
            static_id,
        ));
        self.events.push(ClientEvent::EntityCreated {
            id: entity_id,
            payload,
        });
        Ok(())
    }

    fn on_destroy_entity(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let entity_id = reader.read_i32()?;
        let payload_length = reader.read_u16()? as usize;
        let payload = reader.read_data(payload_length)?.to_vec();

        let Some(room) = self.room.as_mut() else {
            warn!("entity destruction without a room, discarding");
            return Ok(());
        };
        if room.remove_entity(entity_id).is_none() {
            warn!("destroy notification for unknown entity {entity_id}");
            return Ok(());
        }
        self.events.push(ClientEvent::EntityDestroyed {
            id: entity_id,
            payload,
        });
        Ok(())
    }

    fn on_replicate_entity_state(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let entity_id = reader.read_i32()?;

        let Some(room) = self.room.as_mut() else {
            warn!("state update without a room, discarding");
            return Ok(());
        };
        let Some(entity) = room.entity_mut(entity_id) else {
            // each state frame carries exactly one entity's walk, so the
            // rest of the frame can be discarded without a size table
            warn!("state update for unknown entity {entity_id}, discarding frame");
            return Ok(());
        };
        entity.read_state(reader)?;
        self.events
            .push(ClientEvent::EntityStateUpdated { id: entity_id });
        Ok(())
    }

    fn on_replicate_event(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let sender = reader.read_u16()?;
        let mode = ReplicationMode::try_from(reader.read_byte()?)?;
        let code = reader.read_u16()?;

        let Some(room) = self.room.as_ref() else {
            warn!("event without a room, discarding");
            return Ok(());
        };
        // the sender already observed its own LocalAndServer event at send
        // time; the server's rebroadcast must not deliver it twice
        if mode == ReplicationMode::LocalAndServer && room.local_peer() == Some(sender) {
            return Ok(());
        }

        match self.protocol.event_kinds.decode(code, reader) {
            Ok(container) => self.events.push(ClientEvent::Event {
                sender,
                event: container,
            }),
            Err(err) => warn!("undecodable event {code} from peer {sender}: {err}"),
        }
        Ok(())
    }

    fn on_replicate_entity_event(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let code = reader.read_u16()?;
        let sender = reader.read_u16()?;
        let mode = ReplicationMode::try_from(reader.read_byte()?)?;
        let entity_id = reader.read_i32()?;

        let Some(room) = self.room.as_ref() else {
            warn!("entity event without a room, discarding");
            return Ok(());
        };
        if mode == ReplicationMode::LocalAndServer && room.local_peer() == Some(sender) {
            return Ok(());
        }
        if room.entity(entity_id).is_none() {
            warn!("event {code} for unknown entity {entity_id}, discarding");
            return Ok(());
        }

        match self.protocol.event_kinds.decode(code, reader) {
            Ok(container) => self.events.push(ClientEvent::EntityEvent {
                sender,
                entity_id,
                event: container,
            }),
            Err(err) => warn!("undecodable entity event {code} from peer {sender}: {err}"),
        }
        Ok(())
    }

    fn on_load_scene(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let scene = reader.read_string()?;

        let Some(room) = self.room.as_mut() else {
            warn!("scene-load request without a room, discarding");
            return Ok(());
        };
        // current entities are invalid under the new scene; the roster
        // survives
        room.clear_entities();
        self.events.push(ClientEvent::SceneLoadRequested { scene });
        Ok(())
    }

    fn on_snapshot(&mut self, reader: &mut ByteReader) -> Result<(), ClientError> {
        let Some(room) = self.room.as_mut() else {
            warn!("snapshot without a room, discarding");
            return Ok(());
        };
        match apply_snapshot(room, &self.protocol.entity_kinds, &self.statics, reader) {
            Ok(()) => {
                self.events.push(ClientEvent::JoinedRoom);
            }
            Err(err) => {
                // the cursor is unrecoverable mid-snapshot; reset the
                // connection rather than apply garbage
                warn!("snapshot decode failed, disconnecting: {err}");
                self.transport.disconnect();
                self.teardown(DisconnectReason::Requested);
            }
        }
        Ok(())
    }

    fn on_restore_end(&mut self) -> Result<(), ClientError> {
        let mut writer = ByteWriter::new();
        writer.write_op(Opcode::Restored.value())?;
        self.send_reliable(&writer)?;
        self.events.push(ClientEvent::Restored);
        Ok(())
    }
}

/// Write a `u16` length prefix, then splice the payload into the reserved
/// span
fn write_payload(writer: &mut ByteWriter, payload: &[u8]) -> Result<(), SerdeErr> {
    if payload.len() > u16::MAX as usize {
        return Err(SerdeErr::PayloadTooLong {
            length: payload.len(),
        });
    }
    writer.write_u16(payload.len() as u16)?;
    writer.writable_data(payload.len())?.copy_from_slice(payload);
    Ok(())
}
