use std::collections::HashMap;

use log::warn;

use tether_serde::{ByteReader, SerdeErr};

use crate::types::EntityTypeId;

/// Wire sizing of one replicated property
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeMode {
    /// Exactly this many bytes on the wire, with no length prefix
    Fixed(usize),
    /// A `u16` length prefix followed by the payload
    Variable,
}

/// One replicated field declared for an entity type
#[derive(Clone, Debug)]
pub struct PropertySpec {
    name: &'static str,
    size: SizeMode,
}

impl PropertySpec {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> SizeMode {
        self.size
    }
}

/// The ordered property list declared for one entity type.
///
/// Properties are declared once, at registration time, and never reordered.
/// The declaration order here must match the server's declaration for the
/// same type id exactly: state frames carry no per-property type tags, so a
/// mismatched order corrupts every subsequent property in the frame. That
/// parity cannot be verified locally (registration is not server-negotiated)
/// and is the application's contract to uphold.
#[derive(Clone, Debug)]
pub struct EntityLayout {
    type_id: EntityTypeId,
    properties: Vec<PropertySpec>,
}

impl EntityLayout {
    pub fn new(type_id: EntityTypeId) -> Self {
        Self {
            type_id,
            properties: Vec::new(),
        }
    }

    /// Declare the next property in order
    pub fn with_property(mut self, name: &'static str, size: SizeMode) -> Self {
        self.properties.push(PropertySpec { name, size });
        self
    }

    pub fn type_id(&self) -> EntityTypeId {
        self.type_id
    }

    pub fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    pub fn property(&self, index: usize) -> Option<&PropertySpec> {
        self.properties.get(index)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Consume one state-replication property walk without applying it.
    ///
    /// The walk is one `bool` per declared property, each followed by that
    /// property's payload when the flag is set. Fixed-size payloads carry no
    /// length prefix, so skipping requires this layout's size table; that is
    /// why layouts stay registered for the whole session.
    pub fn skip_state(&self, reader: &mut ByteReader) -> Result<(), SerdeErr> {
        for spec in &self.properties {
            if !reader.read_bool()? {
                continue;
            }
            match spec.size {
                SizeMode::Fixed(length) => {
                    reader.read_data(length)?;
                }
                SizeMode::Variable => {
                    let length = reader.read_u16()? as usize;
                    reader.read_data(length)?;
                }
            }
        }
        Ok(())
    }
}

/// Registry of every entity layout this client can replicate
#[derive(Default)]
pub struct EntityKinds {
    layouts: HashMap<EntityTypeId, EntityLayout>,
}

impl EntityKinds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layout. Registering the same type id twice is an
    /// application error: the duplicate is dropped and a warning logged.
    pub fn add_layout(&mut self, layout: EntityLayout) {
        let type_id = layout.type_id();
        if self.layouts.contains_key(&type_id) {
            warn!("entity layout {type_id} is already registered, ignoring duplicate");
            return;
        }
        self.layouts.insert(type_id, layout);
    }

    pub fn layout(&self, type_id: EntityTypeId) -> Option<&EntityLayout> {
        self.layouts.get(&type_id)
    }
}
