/// Transport-level peer identifier, assigned by the server per connection.
/// Meaningful only within the lifetime of a room membership.
pub type PeerId = u16;

/// Server-assigned replicated-entity identifier, unique within one room's
/// lifetime. Ids from a previous room are invalid after leaving it.
pub type EntityId = i32;

/// Registered entity-type identifier; the layout registered under this id
/// must match the server's declaration order exactly.
pub type EntityTypeId = u16;

/// Compact wire code for a registered event payload type
pub type EventCode = u16;

/// Server-assigned identifier matching a pre-placed (static) entity to the
/// client's local content
pub type StaticId = u16;
