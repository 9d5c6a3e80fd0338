//! Core [`Component`] trait and the [`ComponentKind`] tag.
//!
//! Every piece of data attached to an entity implements [`Component`]. The
//! trait requires a compile-time name; that name is the component's
//! [`ComponentKind`] and is what a world keys storage and bit assignment on.
//!
//! ## Kind identity
//!
//! Kinds are compared by their name string. Two distinct Rust types that
//! report the same [`Component::type_name`] are treated as the same kind, so
//! names must be unique within one world.

use std::fmt;

/// The type identity of a component, e.g. `"Position"`.
///
/// Obtained from a component type with [`ComponentKind::of`] or
/// [`Component::kind`]. Kinds are cheap to copy and hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(&'static str);

impl ComponentKind {
    /// Build a kind directly from its name.
    #[must_use]
    pub const fn from_name(name: &'static str) -> Self {
        Self(name)
    }

    /// The kind of component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }

    /// Returns the kind's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The core component trait.
///
/// # Examples
///
/// ```rust
/// use miniecs_component::{Component, ComponentKind};
///
/// #[derive(Debug, Clone)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
///
/// assert_eq!(Health::kind(), ComponentKind::from_name("Health"));
/// ```
pub trait Component: 'static {
    /// A stable, human-readable name for this component type.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentKind`] for this component type.
    fn kind() -> ComponentKind {
        ComponentKind::from_name(Self::type_name())
    }
}
