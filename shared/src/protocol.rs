use tether_serde::Serde;

use crate::{
    entity_layout::{EntityKinds, EntityLayout},
    event_kinds::EventKinds,
    types::EventCode,
};

/// Hook for library users to bundle related registrations
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

/// The full registration surface shared by every peer of a session: entity
/// layouts and event types.
///
/// Built once at startup with chained calls, locked, then handed to the
/// client by value. Both sides of the connection must perform identical
/// registrations in identical order; the protocol carries no negotiation.
pub struct Protocol {
    pub entity_kinds: EntityKinds,
    pub event_kinds: EventKinds,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            entity_kinds: EntityKinds::new(),
            event_kinds: EventKinds::new(),
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    /// Declare an entity type's ordered property layout
    pub fn add_entity_layout(&mut self, layout: EntityLayout) -> &mut Self {
        self.check_lock();
        self.entity_kinds.add_layout(layout);
        self
    }

    /// Register an event payload type under the next code in sequence
    pub fn add_event<T: Serde + 'static>(&mut self) -> &mut Self {
        self.check_lock();
        self.event_kinds.add_event::<T>();
        self
    }

    /// Register an event payload type under an explicit code
    pub fn add_event_with_code<T: Serde + 'static>(&mut self, code: EventCode) -> &mut Self {
        self.check_lock();
        self.event_kinds.add_event_with_code::<T>(code);
        self
    }

    /// Freeze the protocol. Registrations after this point are a programming
    /// error and panic.
    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn check_lock(&self) {
        if self.locked {
            panic!("protocol is locked, cannot be mutated after this point");
        }
    }

    /// Lock and take ownership, for handing to a client constructor
    pub fn build(&mut self) -> Protocol {
        if !self.locked {
            self.lock();
        }
        std::mem::take(self)
    }
}
