use crate::error::WireError;

/// Where a replicated event is delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReplicationMode {
    /// Sent to the server only; the server rebroadcasts to relevant peers.
    /// Local listeners are not invoked.
    ServerOnly = 0,
    /// Invoked on local listeners immediately; never sent over the wire
    LocalOnly = 1,
    /// Invoked on local listeners immediately and sent to the server. The
    /// sender is never re-notified when the server's rebroadcast arrives.
    LocalAndServer = 2,
}

impl ReplicationMode {
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ReplicationMode {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ReplicationMode::ServerOnly),
            1 => Ok(ReplicationMode::LocalOnly),
            2 => Ok(ReplicationMode::LocalAndServer),
            _ => Err(WireError::UnknownReplicationMode { value }),
        }
    }
}
