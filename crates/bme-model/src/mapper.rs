//! Contract between domain objects and their UI-facing transfer objects.

use crate::presence::PresenceFlag;

/// Pure, per-entity conversion in both directions.
///
/// `to_dto` may collapse presence information into plain lists; `to_do`
/// re-derives it with [`rederive_presence`] so that a DTO which was never
/// edited maps back to the same flags it came from.
pub trait Mapper {
    type Do;
    type Dto;

    fn to_dto(source: &Self::Do) -> Self::Dto;

    fn to_do(source: &Self::Dto) -> Self::Do;
}

/// Presence for a collection coming back from a DTO.
///
/// `hint` is the flag the DTO retained (if any), `len` the number of items
/// it now holds. Items are never dropped: a non-empty collection is always
/// emitted even when the hint says `Absent`. Without a hint the collection
/// is treated as present, which yields `PresentEmpty` for an empty one.
pub fn rederive_presence(hint: Option<PresenceFlag>, len: usize) -> PresenceFlag {
    match hint {
        Some(PresenceFlag::Absent) if len == 0 => PresenceFlag::Absent,
        Some(flag) => flag.reevaluate(true, len > 0),
        None => PresenceFlag::PresentWithValues.reevaluate(true, len > 0),
    }
}
