use thiserror::Error;

use tether_shared::{
    Authority, ByteReader, ByteWriter, EntityId, EntityLayout, EntityTypeId, PeerId, Serde,
    SerdeErr, SizeMode, StaticId,
};

/// Errors from per-entity property access
#[derive(Debug, Error)]
pub enum EntityError {
    /// The property index is outside the entity type's declared layout
    #[error("property index {index} out of range for entity type {type_id} ({count} properties)")]
    PropertyOutOfRange {
        index: usize,
        type_id: EntityTypeId,
        count: usize,
    },

    /// A value for a fixed-size property encoded to the wrong width
    #[error("value for fixed-size property {name} encoded to {actual} bytes, expected {expected}")]
    FixedSizeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A property decode left bytes unconsumed, meaning the requested type
    /// does not match the stored value
    #[error("decoding property {name} left {remaining} bytes unconsumed")]
    TrailingBytes {
        name: &'static str,
        remaining: usize,
    },

    /// The local player lacks authority to mutate this entity
    #[error("entity {id} is owner-only and owned by peer {owner}")]
    NotAuthorized { id: EntityId, owner: PeerId },

    #[error(transparent)]
    Serde(#[from] SerdeErr),
}

/// One replicated field's current encoded value plus its dirty flag
struct PropertySlot {
    bytes: Vec<u8>,
    dirty: bool,
}

/// A replicated object: a server-assigned id, an owning player, authority
/// policies, and an ordered list of property slots matching the registered
/// layout for its type.
///
/// Property values are held in wire encoding. Typed access goes through
/// [`Entity::property`] / [`Entity::set_property`]; a set marks the slot and
/// the entity dirty, and multiple sets between replication ticks coalesce
/// into one flag.
pub struct Entity {
    id: EntityId,
    layout: EntityLayout,
    owner_peer: PeerId,
    local_peer: PeerId,
    state_authority: Authority,
    event_authority: Authority,
    static_id: Option<StaticId>,
    attached: bool,
    auto_replicate: bool,
    dirty: bool,
    slots: Vec<PropertySlot>,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        layout: EntityLayout,
        owner_peer: PeerId,
        local_peer: PeerId,
        state_authority: Authority,
        event_authority: Authority,
        static_id: Option<StaticId>,
    ) -> Self {
        let slots = layout
            .properties()
            .iter()
            .map(|spec| PropertySlot {
                bytes: match spec.size() {
                    SizeMode::Fixed(length) => vec![0; length],
                    SizeMode::Variable => Vec::new(),
                },
                dirty: false,
            })
            .collect();

        Self {
            id,
            layout,
            owner_peer,
            local_peer,
            state_authority,
            event_authority,
            static_id,
            attached: true,
            auto_replicate: true,
            dirty: false,
            slots,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn type_id(&self) -> EntityTypeId {
        self.layout.type_id()
    }

    pub fn owner_peer(&self) -> PeerId {
        self.owner_peer
    }

    pub fn state_authority(&self) -> Authority {
        self.state_authority
    }

    pub fn event_authority(&self) -> Authority {
        self.event_authority
    }

    pub fn static_id(&self) -> Option<StaticId> {
        self.static_id
    }

    /// Whether the local player owns this entity
    pub fn is_mine(&self) -> bool {
        self.owner_peer == self.local_peer
    }

    /// Whether the local player may mutate this entity's state
    pub fn has_state_authority(&self) -> bool {
        match self.state_authority {
            Authority::OwnerOnly => self.is_mine(),
            Authority::Everyone => true,
        }
    }

    /// Whether the local player may originate events for this entity
    pub fn has_event_authority(&self) -> bool {
        match self.event_authority {
            Authority::OwnerOnly => self.is_mine(),
            Authority::Everyone => true,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Detached entities are excluded from the automatic replication tick
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn auto_replicates(&self) -> bool {
        self.auto_replicate
    }

    pub fn set_auto_replicate(&mut self, auto_replicate: bool) {
        self.auto_replicate = auto_replicate;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn property_count(&self) -> usize {
        self.slots.len()
    }

    pub fn property_is_dirty(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.dirty)
    }

    pub(crate) fn change_owner(&mut self, new_owner: PeerId) {
        self.owner_peer = new_owner;
    }

    /// Decode the current value of a property
    pub fn property<T: Serde>(&self, index: usize) -> Result<T, EntityError> {
        let slot = self.slot(index)?;
        let spec = self.layout.property(index).ok_or_else(|| self.out_of_range(index))?;

        let mut reader = ByteReader::new(&slot.bytes);
        let value = T::de(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(EntityError::TrailingBytes {
                name: spec.name(),
                remaining: reader.remaining(),
            });
        }
        Ok(value)
    }

    /// Set a property's value, marking it and the entity dirty.
    ///
    /// Rejected when the entity is owner-only and owned by another player,
    /// and when a fixed-size property's value encodes to the wrong width.
    pub fn set_property<T: Serde>(&mut self, index: usize, value: &T) -> Result<(), EntityError> {
        if !self.has_state_authority() {
            return Err(EntityError::NotAuthorized {
                id: self.id,
                owner: self.owner_peer,
            });
        }

        let spec = self
            .layout
            .property(index)
            .ok_or_else(|| self.out_of_range(index))?;

        let mut writer = ByteWriter::new();
        value.ser(&mut writer)?;
        match spec.size() {
            SizeMode::Fixed(expected) => {
                if writer.len() != expected {
                    return Err(EntityError::FixedSizeMismatch {
                        name: spec.name(),
                        expected,
                        actual: writer.len(),
                    });
                }
            }
            SizeMode::Variable => {
                if writer.len() > u16::MAX as usize {
                    return Err(EntityError::Serde(SerdeErr::PayloadTooLong {
                        length: writer.len(),
                    }));
                }
            }
        }

        let slot = &mut self.slots[index];
        slot.bytes = writer.to_bytes().into_vec();
        slot.dirty = true;
        self.dirty = true;
        Ok(())
    }

    fn slot(&self, index: usize) -> Result<&PropertySlot, EntityError> {
        self.slots.get(index).ok_or_else(|| self.out_of_range(index))
    }

    fn out_of_range(&self, index: usize) -> EntityError {
        EntityError::PropertyOutOfRange {
            index,
            type_id: self.layout.type_id(),
            count: self.slots.len(),
        }
    }

    /// Encode the delta property walk: one `bool` per property in
    /// declaration order, payload following each set flag. Clears all dirty
    /// flags once the walk has been written.
    pub(crate) fn write_state(&mut self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        for (slot, spec) in self.slots.iter().zip(self.layout.properties()) {
            writer.write_bool(slot.dirty)?;
            if slot.dirty {
                Self::write_payload(writer, spec.size(), &slot.bytes)?;
            }
        }
        self.clear_dirty();
        Ok(())
    }

    /// Encode every property regardless of dirtiness, for a one-shot manual
    /// full-state push. Also clears dirty flags: the full state was just
    /// made visible, so there is nothing left to delta.
    pub(crate) fn write_full_state(&mut self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        for (slot, spec) in self.slots.iter().zip(self.layout.properties()) {
            writer.write_bool(true)?;
            Self::write_payload(writer, spec.size(), &slot.bytes)?;
        }
        self.clear_dirty();
        Ok(())
    }

    fn write_payload(
        writer: &mut ByteWriter,
        size: SizeMode,
        bytes: &[u8],
    ) -> Result<(), SerdeErr> {
        match size {
            SizeMode::Fixed(_) => writer.write_data(bytes),
            SizeMode::Variable => {
                writer.write_u16(bytes.len() as u16)?;
                writer.write_data(bytes)
            }
        }
    }

    /// Decode a property walk from the remote host, mirroring
    /// [`Entity::write_state`]. A cleared flag means "unchanged, skip".
    /// Remote updates do not mark properties dirty.
    pub(crate) fn read_state(&mut self, reader: &mut ByteReader) -> Result<(), SerdeErr> {
        for (slot, spec) in self.slots.iter_mut().zip(self.layout.properties()) {
            if !reader.read_bool()? {
                continue;
            }
            match spec.size() {
                SizeMode::Fixed(length) => {
                    slot.bytes = reader.read_data(length)?.to_vec();
                }
                SizeMode::Variable => {
                    let length = reader.read_u16()? as usize;
                    slot.bytes = reader.read_data(length)?.to_vec();
                }
            }
        }
        Ok(())
    }

    fn clear_dirty(&mut self) {
        for slot in &mut self.slots {
            slot.dirty = false;
        }
        self.dirty = false;
    }
}
