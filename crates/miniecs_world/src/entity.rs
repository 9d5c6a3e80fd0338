//! Entity storage and the handles used to read and mutate it.
//!
//! The world owns every [`EntityRecord`]. Client code reaches an entity
//! through an [`EntityRef`] (shared borrow) or an [`EntityMut`] (exclusive
//! borrow). An `EntityMut` borrows the world's component registry and query
//! cache alongside the record, so every component change re-evaluates the
//! cached queries before the call returns.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use miniecs_component::{Bitmask, Component, ComponentKind, EntityId};
use tracing::trace;

use crate::query::QueryCache;
use crate::registry::ComponentRegistry;

/// An entity's components and the mask mirroring them.
///
/// Invariant: `mask.has(bit(k))` holds exactly for the kinds `k` present in
/// `components`.
pub(crate) struct EntityRecord {
    pub(crate) id: EntityId,
    pub(crate) mask: Bitmask,
    pub(crate) components: HashMap<ComponentKind, Box<dyn Any>>,
    pub(crate) removed: bool,
}

impl EntityRecord {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            mask: Bitmask::new(),
            components: HashMap::new(),
            removed: false,
        }
    }

    fn get<T: Component>(&self) -> Option<&T> {
        self.components
            .get(&T::kind())
            .and_then(|component| component.downcast_ref::<T>())
    }

    fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&T::kind())
            .and_then(|component| component.downcast_mut::<T>())
    }
}

impl fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("id", &self.id)
            .field("mask", &self.mask)
            .field("kinds", &self.components.keys().collect::<Vec<_>>())
            .field("removed", &self.removed)
            .finish()
    }
}

/// Read-only view of an entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityRef<'w> {
    record: &'w EntityRecord,
}

impl<'w> EntityRef<'w> {
    pub(crate) fn new(record: &'w EntityRecord) -> Self {
        Self { record }
    }

    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> &'w EntityId {
        &self.record.id
    }

    /// The component of type `T`, or `None` if the entity has none.
    #[must_use]
    pub fn get_component<T: Component>(&self) -> Option<&'w T> {
        self.record.get::<T>()
    }

    /// Returns `true` if the entity has a component of type `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.has_kind(T::kind())
    }

    /// Returns `true` if the entity has a component of kind `kind`.
    #[must_use]
    pub fn has_kind(&self, kind: ComponentKind) -> bool {
        self.record.components.contains_key(&kind)
    }

    /// The entity's component mask.
    #[must_use]
    pub fn mask(&self) -> &'w Bitmask {
        &self.record.mask
    }

    /// Returns `true` once removal has been requested. The entity stays
    /// visible until the next tick.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.record.removed
    }

    /// Number of components attached.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.record.components.len()
    }

    /// Kinds of the attached components, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + 'w {
        self.record.components.keys().copied()
    }
}

/// Exclusive handle to an entity, returned by
/// [`World::add_entity`](crate::World::add_entity) and
/// [`World::entity_mut`](crate::World::entity_mut).
///
/// Mutations chain:
///
/// ```rust
/// use miniecs_component::Component;
/// use miniecs_world::World;
///
/// struct Position(f32, f32);
/// impl Component for Position {
///     fn type_name() -> &'static str { "Position" }
/// }
///
/// struct Velocity(f32, f32);
/// impl Component for Velocity {
///     fn type_name() -> &'static str { "Velocity" }
/// }
///
/// let mut world = World::<()>::new();
/// let id = world
///     .add_entity()
///     .unwrap()
///     .add_component(Position(0.0, 0.0))
///     .add_component(Velocity(1.0, 0.0))
///     .id()
///     .clone();
/// assert_eq!(world.entity(&id).map(|e| e.component_count()), Some(2));
/// ```
pub struct EntityMut<'w> {
    record: &'w mut EntityRecord,
    components: &'w mut ComponentRegistry,
    queries: &'w mut QueryCache,
}

impl<'w> EntityMut<'w> {
    pub(crate) fn new(
        record: &'w mut EntityRecord,
        components: &'w mut ComponentRegistry,
        queries: &'w mut QueryCache,
    ) -> Self {
        Self {
            record,
            components,
            queries,
        }
    }

    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.record.id
    }

    /// The component of type `T`, or `None` if the entity has none.
    #[must_use]
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.record.get::<T>()
    }

    /// Mutable access to the component of type `T`.
    ///
    /// Editing a component's value never changes query membership.
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.record.get_mut::<T>()
    }

    /// Returns `true` if the entity has a component of type `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.has_kind(T::kind())
    }

    /// Returns `true` if the entity has a component of kind `kind`.
    #[must_use]
    pub fn has_kind(&self, kind: ComponentKind) -> bool {
        self.record.components.contains_key(&kind)
    }

    /// The entity's component mask.
    #[must_use]
    pub fn mask(&self) -> &Bitmask {
        &self.record.mask
    }

    /// Returns `true` once removal has been requested.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.record.removed
    }

    /// Number of components attached.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.record.components.len()
    }

    /// Attach `component`, replacing any existing component of the same kind,
    /// and update every cached query.
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut Self {
        let kind = T::kind();
        let bit = self.components.register(kind);
        self.record.mask.add(bit);
        self.record.components.insert(kind, Box::new(component));
        trace!(entity = %self.record.id, %kind, "component added");
        self.queries.update_entity(self.record);
        self
    }

    /// Detach the component of type `T`, if any, and update every cached
    /// query.
    pub fn remove_component<T: Component>(&mut self) {
        self.remove_kind(T::kind());
    }

    /// Detach the component of kind `kind`, if any, and update every cached
    /// query.
    ///
    /// An unseen kind is still registered, so it gets a bit even though no
    /// entity holds it.
    pub fn remove_kind(&mut self, kind: ComponentKind) {
        let bit = self.components.register(kind);
        self.record.mask.remove(bit);
        if self.record.components.remove(&kind).is_some() {
            trace!(entity = %self.record.id, %kind, "component removed");
        }
        self.queries.update_entity(self.record);
    }
}

impl fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityMut").field(&self.record).finish()
    }
}
