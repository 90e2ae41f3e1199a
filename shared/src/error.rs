use thiserror::Error;

/// Malformed wire-level values received from the remote host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The leading `u16` of a frame matched no known operation
    #[error("unknown opcode {value}")]
    UnknownOpcode { value: u16 },

    /// An authority byte was outside the defined range
    #[error("unknown authority byte {value}")]
    UnknownAuthority { value: u8 },

    /// A replication-mode byte was outside the defined range
    #[error("unknown replication mode byte {value}")]
    UnknownReplicationMode { value: u8 },
}
