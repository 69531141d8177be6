//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Two value objects with the same attribute values are the same value. An
/// ingredient key `("Flour", "g")` is a value object; a `Recipe` is not.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Amount(u32);
///
/// impl ValueObject for Amount {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
