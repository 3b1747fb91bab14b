//! Entity trait: identity that never changes once a record is written.

/// Entity marker + minimal interface.
///
/// Ledger records are immutable, so the identifier doubles as the storage key.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
