use std::any::{Any, TypeId};
use std::collections::HashMap;

use log::warn;
use thiserror::Error;

use tether_serde::{ByteReader, Serde, SerdeErr};

use crate::types::EventCode;

/// Errors from event registration and decoding
#[derive(Debug, Error)]
pub enum EventError {
    /// An event of an unregistered type was submitted for replication
    #[error("event type {type_name} is not registered")]
    NotRegistered { type_name: &'static str },

    /// A frame referenced an event code this client never registered
    #[error("unknown event code {code}")]
    UnknownCode { code: EventCode },

    /// The event payload could not be decoded
    #[error(transparent)]
    Serde(#[from] SerdeErr),
}

/// A decoded event payload, typed by its wire code.
///
/// The payload is held as `dyn Any`; the consumer that registered the type
/// recovers it with [`EventContainer::downcast`].
pub struct EventContainer {
    code: EventCode,
    inner: Box<dyn Any>,
}

impl std::fmt::Debug for EventContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventContainer")
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

impl EventContainer {
    pub fn code(&self) -> EventCode {
        self.code
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        let code = self.code;
        match self.inner.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(inner) => Err(Self { code, inner }),
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

type DecodeFn = fn(&mut ByteReader) -> Result<Box<dyn Any>, SerdeErr>;

fn decode_event<T: Serde + 'static>(reader: &mut ByteReader) -> Result<Box<dyn Any>, SerdeErr> {
    Ok(Box::new(T::de(reader)?))
}

/// Bidirectional map between event payload types and their wire codes.
///
/// Codes are assigned monotonically in registration order unless an explicit
/// code is supplied. Every peer sharing the protocol must register the same
/// types in the same order, or codes will not be mutually intelligible;
/// registration is not server-negotiated.
#[derive(Default)]
pub struct EventKinds {
    codes: HashMap<TypeId, EventCode>,
    decoders: HashMap<EventCode, DecodeFn>,
    next_code: EventCode,
}

impl EventKinds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event type under the next code in sequence
    pub fn add_event<T: Serde + 'static>(&mut self) {
        let code = self.next_code;
        self.add_event_with_code::<T>(code);
    }

    /// Register an event type under an explicit code. Duplicate type or
    /// code registrations are dropped with a warning.
    pub fn add_event_with_code<T: Serde + 'static>(&mut self, code: EventCode) {
        let type_name = std::any::type_name::<T>();
        if self.codes.contains_key(&TypeId::of::<T>()) {
            warn!("event type {type_name} is already registered, ignoring duplicate");
            return;
        }
        if self.decoders.contains_key(&code) {
            warn!("event code {code} is already taken, ignoring registration of {type_name}");
            return;
        }
        self.codes.insert(TypeId::of::<T>(), code);
        self.decoders.insert(code, decode_event::<T>);
        self.next_code = self.next_code.max(code.saturating_add(1));
    }

    /// The wire code assigned to a registered type
    pub fn code_of<T: 'static>(&self) -> Result<EventCode, EventError> {
        self.codes
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(EventError::NotRegistered {
                type_name: std::any::type_name::<T>(),
            })
    }

    /// Decode the payload registered under `code` from the frame tail
    pub fn decode(&self, code: EventCode, reader: &mut ByteReader) -> Result<EventContainer, EventError> {
        let decode = self
            .decoders
            .get(&code)
            .ok_or(EventError::UnknownCode { code })?;
        let inner = decode(reader)?;
        Ok(EventContainer { code, inner })
    }
}
