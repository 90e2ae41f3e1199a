use thiserror::Error;

/// Errors that can occur while encoding or decoding wire data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Attempted to read past the end of the input span
    #[error("attempted to read {requested} bytes with only {remaining} remaining")]
    UnexpectedEnd { requested: usize, remaining: usize },

    /// A write would exceed the writer's fixed capacity
    #[error("write of {requested} more bytes would exceed the capacity limit of {limit}")]
    CapacityExceeded { requested: usize, limit: usize },

    /// A string payload was not valid UTF-8
    #[error("string payload of {length} bytes is not valid UTF-8")]
    InvalidUtf8 { length: usize },

    /// A length-prefixed payload was too long for its u16 prefix
    #[error("payload of {length} bytes exceeds the u16 length prefix")]
    PayloadTooLong { length: usize },
}
