use std::collections::{HashMap, HashSet};

use log::warn;

use tether_shared::{EntityId, PeerId};

use crate::entity::Entity;

/// One connected peer in the room's roster
#[derive(Clone, Debug)]
pub struct Player {
    peer_id: PeerId,
    stable_id: String,
    name: String,
}

impl Player {
    pub(crate) fn new(peer_id: PeerId, stable_id: String, name: String) -> Self {
        Self {
            peer_id,
            stable_id,
            name,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// The stable identifier assigned at authorization, constant across
    /// reconnects
    pub fn stable_id(&self) -> &str {
        &self.stable_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The joined session: a bounded roster of players, an owner designation,
/// and the table of live replicated entities.
///
/// A `Room` exists only between a successful join acknowledgment and the
/// subsequent leave or disconnect; it is dropped wholesale on teardown, so
/// entity ids from a previous room never leak into the next one.
pub struct Room {
    id: String,
    min_players: u16,
    max_players: u16,
    owner_id: String,
    local_id: String,
    players: HashMap<PeerId, Player>,
    peer_by_stable_id: HashMap<String, PeerId>,
    join_order: Vec<PeerId>,
    local_peer: Option<PeerId>,
    entities: HashMap<EntityId, Entity>,
    /// Locally-owned entities eligible for the automatic replication tick
    owned: HashSet<EntityId>,
}

impl Room {
    pub(crate) fn new(
        id: String,
        owner_id: String,
        local_id: String,
        min_players: u16,
        max_players: u16,
    ) -> Self {
        Self {
            id,
            min_players,
            max_players,
            owner_id,
            local_id,
            players: HashMap::new(),
            peer_by_stable_id: HashMap::new(),
            join_order: Vec::new(),
            local_peer: None,
            entities: HashMap::new(),
            owned: HashSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn min_players(&self) -> u16 {
        self.min_players
    }

    pub fn max_players(&self) -> u16 {
        self.max_players
    }

    // Roster

    pub fn player(&self, peer_id: PeerId) -> Option<&Player> {
        self.players.get(&peer_id)
    }

    pub fn player_by_stable_id(&self, stable_id: &str) -> Option<&Player> {
        self.peer_by_stable_id
            .get(stable_id)
            .and_then(|peer_id| self.players.get(peer_id))
    }

    /// Players in join order
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.join_order
            .iter()
            .filter_map(|peer_id| self.players.get(peer_id))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// The player designated as room owner, once the roster contains it
    pub fn owner(&self) -> Option<&Player> {
        self.player_by_stable_id(&self.owner_id)
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.player_by_stable_id(&self.local_id)
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn local_peer(&self) -> Option<PeerId> {
        self.local_peer
    }

    /// Whether the local player is the room owner
    pub fn is_local_owner(&self) -> bool {
        self.owner_id == self.local_id
    }

    pub(crate) fn add_player(&mut self, player: Player) {
        let peer_id = player.peer_id();
        if self.players.contains_key(&peer_id) {
            warn!("peer {peer_id} is already in the roster, replacing entry");
        } else {
            self.join_order.push(peer_id);
        }
        if player.stable_id() == self.local_id {
            self.local_peer = Some(peer_id);
        }
        self.peer_by_stable_id
            .insert(player.stable_id().to_string(), peer_id);
        self.players.insert(peer_id, player);
    }

    pub(crate) fn remove_player(&mut self, peer_id: PeerId) -> Option<Player> {
        let player = self.players.remove(&peer_id)?;
        self.peer_by_stable_id.remove(player.stable_id());
        self.join_order.retain(|other| *other != peer_id);
        Some(player)
    }

    pub(crate) fn set_owner_id(&mut self, owner_id: String) {
        self.owner_id = owner_id;
    }

    // Entities

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn add_entity(&mut self, entity: Entity) {
        let id = entity.id();
        if self.entities.contains_key(&id) {
            warn!("entity {id} is already registered, replacing entry");
        }
        if entity.is_mine() {
            self.owned.insert(id);
        }
        self.entities.insert(id, entity);
    }

    pub(crate) fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.owned.remove(&id);
        self.entities.remove(&id)
    }

    pub(crate) fn clear_entities(&mut self) {
        self.entities.clear();
        self.owned.clear();
    }

    /// Re-target an entity's ownership and update the local replication set.
    /// Every `is_mine` consumer observes the transfer immediately; there is
    /// no separate notification.
    pub fn change_entity_owner(&mut self, id: EntityId, new_owner: PeerId) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        entity.change_owner(new_owner);
        if entity.is_mine() {
            self.owned.insert(id);
        } else {
            self.owned.remove(&id);
        }
        true
    }

    /// Entity ids owned by players no longer in the roster, after a leave
    pub(crate) fn entities_owned_by(&self, peer_id: PeerId) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.owner_peer() == peer_id)
            .map(|entity| entity.id())
            .collect()
    }

    /// The per-tick delta set: locally-owned, attached, auto-replicating
    /// entities with pending changes
    pub(crate) fn dirty_owned_entities(&self) -> Vec<EntityId> {
        self.owned
            .iter()
            .copied()
            .filter(|id| {
                self.entities.get(id).is_some_and(|entity| {
                    entity.is_attached() && entity.auto_replicates() && entity.is_dirty()
                })
            })
            .collect()
    }
}
