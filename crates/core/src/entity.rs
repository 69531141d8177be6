//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Recipes and ingredients are entities; cart memberships and aggregated
/// shopping-list lines are not (they are identified by their values).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
