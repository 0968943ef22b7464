//! Entity trait: identity + continuity across redefinition.

/// Entity marker + minimal interface.
///
/// Roles are entities keyed by name: redefining a role under the same name
/// replaces it rather than creating a second one.
pub trait Entity {
    /// Identity key.
    type Id: ?Sized + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identity.
    fn id(&self) -> &Self::Id;
}
