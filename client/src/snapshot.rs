use std::collections::HashMap;

use log::warn;
use thiserror::Error;

use tether_shared::{
    Authority, ByteReader, EntityKinds, EntityTypeId, SerdeErr, StaticId, WireError,
};

use crate::entity::Entity;
use crate::room::{Player, Room};

/// Faults that make a snapshot structurally undecodable. Unlike the
/// skip-and-continue desyncs, these corrupt the cursor for everything that
/// follows, so the caller must tear the connection down.
#[derive(Debug, Error)]
pub(crate) enum SnapshotError {
    /// The roster did not contain the local player's stable id
    #[error("snapshot roster is missing the local player {local_id}")]
    MissingLocalPlayer { local_id: String },

    /// An entity referenced a type with no registered layout; its property
    /// walk cannot be sized, so the rest of the snapshot is unreadable
    #[error("snapshot references unregistered entity type {type_id}")]
    UnknownEntityType { type_id: EntityTypeId },

    #[error(transparent)]
    Serde(#[from] SerdeErr),

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Bulk-decode the initial room state delivered to a newly joined peer:
/// the full roster, every live dynamic entity with its current property
/// values, and the attachment records for pre-placed static entities.
///
/// The room is fully populated when this returns; the caller emits the
/// single joined notification afterward, so listeners never observe a
/// half-built room.
pub(crate) fn apply_snapshot(
    room: &mut Room,
    entity_kinds: &EntityKinds,
    statics: &HashMap<StaticId, EntityTypeId>,
    reader: &mut ByteReader,
) -> Result<(), SnapshotError> {
    // roster
    let player_count = reader.read_u16()?;
    for _ in 0..player_count {
        let peer_id = reader.read_u16()?;
        let stable_id = reader.read_string()?;
        let name = reader.read_string()?;
        room.add_player(Player::new(peer_id, stable_id, name));
    }

    let Some(local_peer) = room.local_peer() else {
        return Err(SnapshotError::MissingLocalPlayer {
            local_id: room.local_id().to_string(),
        });
    };

    // dynamic entities
    let dynamic_count = reader.read_u16()?;
    for _ in 0..dynamic_count {
        let entity_id = reader.read_i32()?;
        let state_authority = read_authority(reader)?;
        let event_authority = read_authority(reader)?;
        let type_id = reader.read_u16()?;
        let owner_peer = reader.read_u16()?;

        let Some(layout) = entity_kinds.layout(type_id) else {
            return Err(SnapshotError::UnknownEntityType { type_id });
        };

        // spawn payload; scene construction is the host application's concern
        let payload_length = reader.read_u16()? as usize;
        reader.read_data(payload_length)?;

        if room.player(owner_peer).is_none() {
            warn!("snapshot entity {entity_id} owned by unknown peer {owner_peer}, skipping");
            layout.skip_state(reader)?;
            continue;
        }

        let mut entity = Entity::new(
            entity_id,
            layout.clone(),
            owner_peer,
            local_peer,
            state_authority,
            event_authority,
            None,
        );
        entity.read_state(reader)?;
        room.add_entity(entity);
    }

    // static entities, matched against the locally-registered content
    let static_count = reader.read_u16()?;
    for _ in 0..static_count {
        let static_id = reader.read_u16()?;
        let type_id = reader.read_u16()?;
        let entity_id = reader.read_i32()?;
        let state_authority = read_authority(reader)?;
        let event_authority = read_authority(reader)?;
        let owner_peer = reader.read_u16()?;

        let Some(layout) = entity_kinds.layout(type_id) else {
            return Err(SnapshotError::UnknownEntityType { type_id });
        };

        match statics.get(&static_id) {
            None => {
                warn!("snapshot static id {static_id} has no local registration, skipping");
                layout.skip_state(reader)?;
                continue;
            }
            Some(registered) if *registered != type_id => {
                warn!(
                    "snapshot static id {static_id} is type {type_id}, registered locally as {registered}, skipping"
                );
                layout.skip_state(reader)?;
                continue;
            }
            Some(_) => {}
        }

        if room.player(owner_peer).is_none() {
            warn!("snapshot static entity {entity_id} owned by unknown peer {owner_peer}, skipping");
            layout.skip_state(reader)?;
            continue;
        }

        let mut entity = Entity::new(
            entity_id,
            layout.clone(),
            owner_peer,
            local_peer,
            state_authority,
            event_authority,
            Some(static_id),
        );
        entity.read_state(reader)?;
        room.add_entity(entity);
    }

    Ok(())
}

fn read_authority(reader: &mut ByteReader) -> Result<Authority, SnapshotError> {
    let value = reader.read_byte()?;
    Ok(Authority::try_from(value)?)
}
