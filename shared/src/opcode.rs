use crate::error::WireError;

/// The leading `u16` tag identifying a frame's purpose and body layout.
///
/// Every frame begins with one of these, written through
/// [`tether_serde::ByteWriter::write_op`]; the body that follows is
/// positional with no self-describing schema, so both sides must agree on
/// this table exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    Authorize = 1,
    AuthorizedSuccess = 2,
    JoinOrCreateRoom = 3,
    CreateRoom = 4,
    JoinRoom = 5,
    JoinSuccess = 6,
    JoinFailed = 7,
    LeaveRoom = 8,
    PlayerJoined = 9,
    PlayerLeft = 10,
    OwnershipChanged = 11,
    CreateEntity = 12,
    CreateStaticEntity = 13,
    DestroyEntity = 14,
    ReplicateEntityState = 15,
    ReplicateEvent = 16,
    ReplicateEntityEvent = 17,
    LoadScene = 18,
    SceneIsLoaded = 19,
    Snapshot = 20,
    RestoreEnd = 21,
    Restored = 22,
}

impl Opcode {
    pub fn value(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Opcode {
    type Error = WireError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let opcode = match value {
            1 => Opcode::Authorize,
            2 => Opcode::AuthorizedSuccess,
            3 => Opcode::JoinOrCreateRoom,
            4 => Opcode::CreateRoom,
            5 => Opcode::JoinRoom,
            6 => Opcode::JoinSuccess,
            7 => Opcode::JoinFailed,
            8 => Opcode::LeaveRoom,
            9 => Opcode::PlayerJoined,
            10 => Opcode::PlayerLeft,
            11 => Opcode::OwnershipChanged,
            12 => Opcode::CreateEntity,
            13 => Opcode::CreateStaticEntity,
            14 => Opcode::DestroyEntity,
            15 => Opcode::ReplicateEntityState,
            16 => Opcode::ReplicateEvent,
            17 => Opcode::ReplicateEntityEvent,
            18 => Opcode::LoadScene,
            19 => Opcode::SceneIsLoaded,
            20 => Opcode::Snapshot,
            21 => Opcode::RestoreEnd,
            22 => Opcode::Restored,
            _ => return Err(WireError::UnknownOpcode { value }),
        };
        Ok(opcode)
    }
}
