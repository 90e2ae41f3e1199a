//! Fake-server frame builders: the peer side of every server-to-client
//! operation, encoded exactly as the wire contract specifies.

use tether_serde::ByteWriter;
use tether_shared::{
    Authority, DeliveryMode, EntityId, EntityTypeId, EventCode, Opcode, PeerId, ReplicationMode,
    StaticId,
};

use super::local_transport::ServerHandle;

/// One frame captured from the client, with its requested delivery mode
pub struct SentFrame {
    pub bytes: Vec<u8>,
    pub mode: DeliveryMode,
}

impl SentFrame {
    pub fn opcode(&self) -> u16 {
        u16::from_le_bytes([self.bytes[0], self.bytes[1]])
    }

    pub fn body(&self) -> &[u8] {
        &self.bytes[2..]
    }
}

/// A dynamic entity entry for a snapshot frame
pub struct DynamicEntitySpec {
    pub id: EntityId,
    pub type_id: EntityTypeId,
    pub owner: PeerId,
    pub state_authority: Authority,
    pub event_authority: Authority,
    pub spawn_payload: Vec<u8>,
    pub walk: Vec<u8>,
}

impl DynamicEntitySpec {
    pub fn new(id: EntityId, type_id: EntityTypeId, owner: PeerId, walk: Vec<u8>) -> Self {
        Self {
            id,
            type_id,
            owner,
            state_authority: Authority::OwnerOnly,
            event_authority: Authority::OwnerOnly,
            spawn_payload: Vec::new(),
            walk,
        }
    }
}

/// A static entity entry for a snapshot frame
pub struct StaticEntitySpec {
    pub static_id: StaticId,
    pub type_id: EntityTypeId,
    pub id: EntityId,
    pub owner: PeerId,
    pub state_authority: Authority,
    pub event_authority: Authority,
    pub walk: Vec<u8>,
}

impl StaticEntitySpec {
    pub fn new(
        static_id: StaticId,
        type_id: EntityTypeId,
        id: EntityId,
        owner: PeerId,
        walk: Vec<u8>,
    ) -> Self {
        Self {
            static_id,
            type_id,
            id,
            owner,
            state_authority: Authority::OwnerOnly,
            event_authority: Authority::OwnerOnly,
            walk,
        }
    }
}

/// Drives the server side of a [`super::local_transport::LocalTransport`]
/// pair
pub struct TestServer {
    handle: ServerHandle,
}

impl TestServer {
    pub fn new(handle: ServerHandle) -> Self {
        Self { handle }
    }

    pub fn take_sent(&self) -> Vec<SentFrame> {
        self.handle
            .take_sent()
            .into_iter()
            .map(|(bytes, mode)| SentFrame { bytes, mode })
            .collect()
    }

    pub fn timeout(&self) {
        self.handle.timeout();
    }

    pub fn drop_connection(&self) {
        self.handle.drop_connection();
    }

    fn deliver(&self, writer: ByteWriter) {
        self.handle.deliver(writer.to_bytes().into_vec());
    }

    fn frame(opcode: Opcode) -> ByteWriter {
        let mut writer = ByteWriter::new();
        writer.write_op(opcode.value()).unwrap();
        writer
    }

    pub fn authorized_success(&self, player_id: &str, name: &str) {
        let mut writer = Self::frame(Opcode::AuthorizedSuccess);
        writer.write_string(player_id).unwrap();
        writer.write_string(name).unwrap();
        self.deliver(writer);
    }

    pub fn join_success(
        &self,
        room_id: &str,
        owner_id: &str,
        local_id: &str,
        min_players: u16,
        max_players: u16,
    ) {
        let mut writer = Self::frame(Opcode::JoinSuccess);
        writer.write_string(room_id).unwrap();
        writer.write_string(owner_id).unwrap();
        writer.write_string(local_id).unwrap();
        writer.write_u16(min_players).unwrap();
        writer.write_u16(max_players).unwrap();
        self.deliver(writer);
    }

    pub fn join_failed(&self, message: &str) {
        let mut writer = Self::frame(Opcode::JoinFailed);
        writer.write_string(message).unwrap();
        self.deliver(writer);
    }

    pub fn leave_room(&self) {
        self.deliver(Self::frame(Opcode::LeaveRoom));
    }

    pub fn player_joined(&self, peer_id: PeerId, player_id: &str, name: &str) {
        let mut writer = Self::frame(Opcode::PlayerJoined);
        writer.write_u16(peer_id).unwrap();
        writer.write_string(player_id).unwrap();
        writer.write_string(name).unwrap();
        self.deliver(writer);
    }

    pub fn player_left(&self, peer_id: PeerId, player_id: &str, destroyed: &[EntityId]) {
        let mut writer = Self::frame(Opcode::PlayerLeft);
        writer.write_u16(peer_id).unwrap();
        writer.write_string(player_id).unwrap();
        writer.write_u16(destroyed.len() as u16).unwrap();
        for id in destroyed {
            writer.write_i32(*id).unwrap();
        }
        self.deliver(writer);
    }

    pub fn ownership_changed(&self, owner_id: &str) {
        let mut writer = Self::frame(Opcode::OwnershipChanged);
        writer.write_string(owner_id).unwrap();
        self.deliver(writer);
    }

    pub fn create_entity(
        &self,
        type_id: EntityTypeId,
        state_authority: Authority,
        event_authority: Authority,
        id: EntityId,
        owner: PeerId,
        spawn_payload: &[u8],
    ) {
        let mut writer = Self::frame(Opcode::CreateEntity);
        writer.write_u16(type_id).unwrap();
        writer.write_byte(state_authority.to_byte()).unwrap();
        writer.write_byte(event_authority.to_byte()).unwrap();
        writer.write_i32(id).unwrap();
        writer.write_u16(owner).unwrap();
        writer.write_u16(spawn_payload.len() as u16).unwrap();
        writer.write_data(spawn_payload).unwrap();
        self.deliver(writer);
    }

    pub fn create_static_entity(
        &self,
        type_id: EntityTypeId,
        static_id: StaticId,
        state_authority: Authority,
        event_authority: Authority,
        id: EntityId,
        owner: PeerId,
        spawn_payload: &[u8],
    ) {
        let mut writer = Self::frame(Opcode::CreateStaticEntity);
        writer.write_u16(type_id).unwrap();
        writer.write_u16(static_id).unwrap();
        writer.write_byte(state_authority.to_byte()).unwrap();
        writer.write_byte(event_authority.to_byte()).unwrap();
        writer.write_i32(id).unwrap();
        writer.write_u16(owner).unwrap();
        writer.write_u16(spawn_payload.len() as u16).unwrap();
        writer.write_data(spawn_payload).unwrap();
        self.deliver(writer);
    }

    pub fn destroy_entity(&self, id: EntityId, payload: &[u8]) {
        let mut writer = Self::frame(Opcode::DestroyEntity);
        writer.write_i32(id).unwrap();
        writer.write_u16(payload.len() as u16).unwrap();
        writer.write_data(payload).unwrap();
        self.deliver(writer);
    }

    pub fn entity_state(&self, id: EntityId, walk: &[u8]) {
        let mut writer = Self::frame(Opcode::ReplicateEntityState);
        writer.write_i32(id).unwrap();
        writer.write_data(walk).unwrap();
        self.deliver(writer);
    }

    pub fn room_event(
        &self,
        sender: PeerId,
        mode: ReplicationMode,
        code: EventCode,
        payload: &[u8],
    ) {
        let mut writer = Self::frame(Opcode::ReplicateEvent);
        writer.write_u16(sender).unwrap();
        writer.write_byte(mode.to_byte()).unwrap();
        writer.write_u16(code).unwrap();
        writer.write_data(payload).unwrap();
        self.deliver(writer);
    }

    pub fn entity_event(
        &self,
        code: EventCode,
        sender: PeerId,
        mode: ReplicationMode,
        entity_id: EntityId,
        payload: &[u8],
    ) {
        let mut writer = Self::frame(Opcode::ReplicateEntityEvent);
        writer.write_u16(code).unwrap();
        writer.write_u16(sender).unwrap();
        writer.write_byte(mode.to_byte()).unwrap();
        writer.write_i32(entity_id).unwrap();
        writer.write_data(payload).unwrap();
        self.deliver(writer);
    }

    pub fn load_scene(&self, scene: &str) {
        let mut writer = Self::frame(Opcode::LoadScene);
        writer.write_string(scene).unwrap();
        self.deliver(writer);
    }

    pub fn restore_end(&self) {
        self.deliver(Self::frame(Opcode::RestoreEnd));
    }

    /// A full snapshot: roster, dynamic entities, then static entities
    pub fn snapshot(
        &self,
        players: &[(PeerId, &str, &str)],
        dynamics: &[DynamicEntitySpec],
        statics: &[StaticEntitySpec],
    ) {
        let mut writer = Self::frame(Opcode::Snapshot);

        writer.write_u16(players.len() as u16).unwrap();
        for (peer_id, player_id, name) in players {
            writer.write_u16(*peer_id).unwrap();
            writer.write_string(player_id).unwrap();
            writer.write_string(name).unwrap();
        }

        writer.write_u16(dynamics.len() as u16).unwrap();
        for spec in dynamics {
            writer.write_i32(spec.id).unwrap();
            writer.write_byte(spec.state_authority.to_byte()).unwrap();
            writer.write_byte(spec.event_authority.to_byte()).unwrap();
            writer.write_u16(spec.type_id).unwrap();
            writer.write_u16(spec.owner).unwrap();
            writer.write_u16(spec.spawn_payload.len() as u16).unwrap();
            writer.write_data(&spec.spawn_payload).unwrap();
            writer.write_data(&spec.walk).unwrap();
        }

        writer.write_u16(statics.len() as u16).unwrap();
        for spec in statics {
            writer.write_u16(spec.static_id).unwrap();
            writer.write_u16(spec.type_id).unwrap();
            writer.write_i32(spec.id).unwrap();
            writer.write_byte(spec.state_authority.to_byte()).unwrap();
            writer.write_byte(spec.event_authority.to_byte()).unwrap();
            writer.write_u16(spec.owner).unwrap();
            writer.write_data(&spec.walk).unwrap();
        }

        self.deliver(writer);
    }
}
