//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Permissions embedded in roles are value objects: a role owns its own copy
/// and two permissions with the same fields are interchangeable. Deduplication
/// is keyed on values, never on where a value happens to live.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
