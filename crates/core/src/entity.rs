//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities are plain data. Persistence lives behind the storage ports of the
/// owning domain crate, never on the entity itself.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
