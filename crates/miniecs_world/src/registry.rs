//! Registries owned by the world.
//!
//! [`ComponentRegistry`] assigns each component kind a dense bit index the
//! first time the kind is seen. [`SystemRegistry`] keeps the registered
//! systems in registration order, at most one per name.

use std::collections::HashMap;
use std::fmt;

use miniecs_component::ComponentKind;
use tracing::debug;

use crate::system::System;

/// Maps component kinds to bit indices.
///
/// Bits are handed out in first-seen order starting at 0. A binding is never
/// changed or released.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    bits: HashMap<ComponentKind, usize>,
    kinds: Vec<ComponentKind>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bit for `kind`, assigning the next free one if unseen.
    pub fn register(&mut self, kind: ComponentKind) -> usize {
        if let Some(&bit) = self.bits.get(&kind) {
            return bit;
        }
        let bit = self.kinds.len();
        self.bits.insert(kind, bit);
        self.kinds.push(kind);
        debug!(%kind, bit, "registered component kind");
        bit
    }

    /// Returns the bit for `kind` without registering it.
    #[must_use]
    pub fn bit(&self, kind: ComponentKind) -> Option<usize> {
        self.bits.get(&kind).copied()
    }

    /// Returns the kind bound to `bit`, if any.
    #[must_use]
    pub fn kind(&self, bit: usize) -> Option<ComponentKind> {
        self.kinds.get(bit).copied()
    }

    /// Number of distinct kinds registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if no kind has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Registered kinds in bit order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.kinds.iter().copied()
    }
}

/// A registered system and the name it is keyed by.
struct RegisteredSystem<C> {
    name: &'static str,
    system: Box<dyn System<C>>,
}

/// Registered systems, in registration order.
pub struct SystemRegistry<C> {
    systems: Vec<RegisteredSystem<C>>,
}

impl<C> SystemRegistry<C> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Register a system under `name`.
    ///
    /// If a system with the same name exists it is replaced in place, keeping
    /// its position in the run order. Returns `true` if a system was replaced.
    pub fn register(&mut self, name: &'static str, system: Box<dyn System<C>>) -> bool {
        if let Some(entry) = self.systems.iter_mut().find(|entry| entry.name == name) {
            entry.system = system;
            return true;
        }
        self.systems.push(RegisteredSystem { name, system });
        false
    }

    /// Move every system from `other` into this registry, in order, with
    /// the same replace-in-place rule as [`SystemRegistry::register`].
    pub fn merge(&mut self, other: SystemRegistry<C>) {
        for entry in other.systems {
            self.register(entry.name, entry.system);
        }
    }

    /// Returns `true` if a system named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.systems.iter().any(|entry| entry.name == name)
    }

    /// Registered names in run order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.iter().map(|entry| entry.name)
    }

    /// Systems in run order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn System<C>>> + '_ {
        self.systems.iter_mut().map(|entry| &mut entry.system)
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl<C> Default for SystemRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for SystemRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
