use crate::error::WireError;

/// Policy governing which peers may originate changes for an entity.
///
/// An entity carries one `Authority` for state replication and one for
/// entity events; the two are independent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Authority {
    /// Only the owning player may originate changes
    OwnerOnly = 0,
    /// Any player in the room may originate changes
    Everyone = 1,
}

impl Authority {
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Authority {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Authority::OwnerOnly),
            1 => Ok(Authority::Everyone),
            _ => Err(WireError::UnknownAuthority { value }),
        }
    }
}
