use thiserror::Error;

/// Delivery class requested for an outgoing payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeliveryMode {
    /// Guaranteed, in-order delivery. Used for authentication, room
    /// membership, and entity create/destroy traffic.
    ReliableOrdered,
    /// Best-effort delivery; payloads may be dropped or arrive out of order.
    /// Used for high-frequency state replication.
    Unreliable,
}

/// Why the transport considers the connection closed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The local host called disconnect
    Requested,
    /// The remote host stopped responding within the transport's timeout
    Timeout,
    /// The underlying transport failed (socket closed, route lost)
    TransportLost,
}

/// Notifications surfaced by a transport, drained once per tick.
///
/// The transport interface is callback-free: implementations queue these
/// internally and the engine polls them from its single update point.
#[derive(Debug)]
pub enum TransportEvent {
    /// The connection handshake completed
    Connected,
    /// The connection closed; timeout and explicit disconnect surface the
    /// same way
    Disconnected(DisconnectReason),
    /// One inbound payload, exactly as framed by the remote host
    Data(Vec<u8>),
}

/// Errors surfaced by transport operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection attempt could not be started
    #[error("failed to connect to {address}:{port}: {message}")]
    ConnectFailed {
        address: String,
        port: u16,
        message: String,
    },

    /// A send was attempted without an established connection
    #[error("transport is not connected")]
    NotConnected,

    /// The transport could not accept the payload
    #[error("failed to send {length} byte payload: {message}")]
    SendFailed { length: usize, message: String },
}

/// A byte-oriented connection to the simulation server.
///
/// The engine is transport-agnostic: any implementation that can deliver and
/// accept whole byte payloads over a reliable-ordered channel and an
/// unreliable channel satisfies the engine, whether it is backed by reliable
/// UDP, WebSockets, or an in-memory queue pair. The engine holds the
/// transport behind `Box<dyn Transport>` and never assumes which is in use.
///
/// `update` must be invoked on every tick of the host's run loop; it is the
/// transport's only opportunity to drive its internal machinery and must not
/// block. `poll_event` is drained after each `update`.
pub trait Transport {
    /// Begin connecting to the given server. Completion is reported via
    /// [`TransportEvent::Connected`].
    fn connect(&mut self, address: &str, port: u16, protocol_id: u32)
        -> Result<(), TransportError>;

    /// Close the connection. Surfaces as
    /// [`TransportEvent::Disconnected`] with [`DisconnectReason::Requested`].
    fn disconnect(&mut self);

    /// Drive internal machinery: flush queued sends, detect timeouts,
    /// collect inbound payloads. Non-blocking.
    fn update(&mut self);

    /// Drain the next pending notification, if any
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Queue one payload for delivery. Fire-and-forget: reliable payloads
    /// may be buffered and retried internally, but that is opaque to the
    /// caller.
    fn send(&mut self, payload: &[u8], mode: DeliveryMode) -> Result<(), TransportError>;
}
