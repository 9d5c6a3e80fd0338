//! The [`World`]: entity table, component registry, query cache, and
//! systems.
//!
//! The world is the only place that creates entities, assigns component bits,
//! or touches query membership. Entity removal is two-phase: `remove_entity`
//! marks the entity, and the next [`World::tick`] purges it from the table and
//! from every query.

use std::collections::HashMap;
use std::fmt;

use miniecs_component::{Bitmask, ComponentKind, EntityAllocator, EntityId};
use tracing::{debug, trace, warn};

use crate::config::WorldConfig;
use crate::entity::{EntityMut, EntityRecord, EntityRef};
use crate::error::{Result, WorldError};
use crate::query::{Query, QueryCache, QueryId};
use crate::registry::{ComponentRegistry, SystemRegistry};
use crate::system::System;

/// The entity-component registry.
///
/// `C` is the payload passed to every system on each tick; see
/// [`System`].
pub struct World<C = ()> {
    pub(crate) config: WorldConfig,
    /// Counter behind automatically assigned ids.
    pub(crate) allocator: EntityAllocator,
    /// Kind → bit table.
    pub(crate) components: ComponentRegistry,
    pub(crate) entities: HashMap<EntityId, EntityRecord>,
    pub(crate) queries: QueryCache,
    pub(crate) systems: SystemRegistry<C>,
    /// Entities marked for removal, purged at the next tick.
    pub(crate) pending_removal: Vec<EntityId>,
    pub(crate) tick_id: u64,
    pub(crate) in_tick: bool,
}

impl<C> World<C> {
    /// Create an empty world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create an empty world with the given configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            allocator: EntityAllocator::starting_at(config.first_entity_id),
            components: ComponentRegistry::new(),
            entities: HashMap::with_capacity(config.entity_capacity),
            queries: QueryCache::with_capacity(
                config.query_capacity,
                config.scan_pending_removal,
            ),
            systems: SystemRegistry::new(),
            pending_removal: Vec::new(),
            tick_id: 0,
            in_tick: false,
            config,
        }
    }

    /// The configuration this world was built with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // -- Entity lifecycle --

    /// Create an entity with the next automatic id.
    ///
    /// Ids count up from [`WorldConfig::first_entity_id`]; values already
    /// taken by explicitly named entities are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::IdsExhausted`] once the counter has passed
    /// `u64::MAX`. Explicit ids keep working.
    pub fn add_entity(&mut self) -> Result<EntityMut<'_>> {
        let id = loop {
            let Some(candidate) = self.allocator.allocate() else {
                warn!("automatic entity ids exhausted");
                return Err(WorldError::IdsExhausted);
            };
            if !self.entities.contains_key(&candidate) {
                break candidate;
            }
        };
        Ok(self.spawn(id))
    }

    /// Create an entity with an explicit id.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateEntity`] if an entity with this id is
    /// still in the table, including one pending removal. The existing
    /// entity is left untouched.
    pub fn add_entity_with_id(&mut self, id: impl Into<EntityId>) -> Result<EntityMut<'_>> {
        let id = id.into();
        if self.entities.contains_key(&id) {
            warn!(entity = %id, "rejected duplicate entity id");
            return Err(WorldError::DuplicateEntity(id));
        }
        Ok(self.spawn(id))
    }

    fn spawn(&mut self, id: EntityId) -> EntityMut<'_> {
        trace!(entity = %id, "entity added");
        let record = self
            .entities
            .entry(id.clone())
            .or_insert_with(|| EntityRecord::new(id));
        // An empty entity already matches queries with an empty mask.
        self.queries.update_entity(record);
        EntityMut::new(record, &mut self.components, &mut self.queries)
    }

    /// Mark an entity for removal at the next tick.
    ///
    /// The entity stays in the table and in every query until then. Marking
    /// an entity that is already pending removal does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] if no entity has this id.
    pub fn remove_entity(&mut self, id: &EntityId) -> Result<()> {
        let record = self
            .entities
            .get_mut(id)
            .ok_or_else(|| WorldError::EntityNotFound(id.clone()))?;
        if !record.removed {
            record.removed = true;
            self.pending_removal.push(id.clone());
            trace!(entity = %id, "entity marked for removal");
        }
        Ok(())
    }

    /// Read-only access to an entity.
    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<EntityRef<'_>> {
        self.entities.get(id).map(EntityRef::new)
    }

    /// Exclusive access to an entity, for adding and removing components.
    pub fn entity_mut(&mut self, id: &EntityId) -> Option<EntityMut<'_>> {
        let record = self.entities.get_mut(id)?;
        Some(EntityMut::new(
            record,
            &mut self.components,
            &mut self.queries,
        ))
    }

    /// Returns `true` if the entity is in the table (live or pending removal).
    #[must_use]
    pub fn contains_entity(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Number of entities in the table, including those pending removal.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Ids of every entity in the table, in no particular order.
    pub fn entity_ids(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.entities.keys()
    }

    /// Number of entities waiting for the next tick to be purged.
    #[must_use]
    pub fn pending_removal_count(&self) -> usize {
        self.pending_removal.len()
    }

    // -- Component kinds --

    /// Returns the bit for `kind`, assigning the next one if the kind is new.
    pub fn register_component(&mut self, kind: ComponentKind) -> usize {
        self.components.register(kind)
    }

    /// Returns the bit for `kind` if it has been registered.
    #[must_use]
    pub fn component_bit(&self, kind: ComponentKind) -> Option<usize> {
        self.components.bit(kind)
    }

    /// The kind bound to `bit`, if any.
    #[must_use]
    pub fn component_kind(&self, bit: usize) -> Option<ComponentKind> {
        self.components.kind(bit)
    }

    /// Registered kinds in bit order.
    pub fn component_kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.kinds()
    }

    /// Number of distinct component kinds registered.
    #[must_use]
    pub fn component_kind_count(&self) -> usize {
        self.components.len()
    }

    // -- Queries --

    /// Get the query for a set of component kinds, creating it on first use.
    ///
    /// Order and duplicates in `kinds` do not matter: equal kind sets share
    /// one cached query. A new query is filled by one scan over the entity
    /// table and kept up to date afterwards. An empty `kinds` matches every
    /// entity.
    pub fn create_query(&mut self, kinds: &[ComponentKind]) -> QueryId {
        let mask: Bitmask = kinds
            .iter()
            .map(|&kind| self.components.register(kind))
            .collect();
        let key = mask.to_canonical_key();
        if let Some(id) = self.queries.lookup(&key) {
            return id;
        }

        let mut query = Query::new(mask);
        for record in self.entities.values() {
            if self.queries.admits(record) && query.matches(&record.mask) {
                query.add_entity(record.id.clone());
            }
        }
        debug!(key = %key, matched = query.len(), "created query");
        self.queries.insert(query)
    }

    /// The query behind `id`.
    #[must_use]
    pub fn query(&self, id: QueryId) -> Option<&Query> {
        self.queries.get(id)
    }

    /// Mutable access to a query, for managing its listeners.
    pub fn query_mut(&mut self, id: QueryId) -> Option<&mut Query> {
        self.queries.get_mut(id)
    }

    /// The members of a query as entity views, ordered by id string
    /// (lexicographic, so `"10"` sorts before `"2"`). Empty if `id`
    /// is unknown.
    pub fn query_entities(&self, id: QueryId) -> impl Iterator<Item = EntityRef<'_>> + '_ {
        self.queries
            .get(id)
            .into_iter()
            .flat_map(Query::entities)
            .filter_map(|id| self.entity(id))
    }

    /// Number of cached queries.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    // -- Systems --

    /// Register a system, replacing any system with the same name in its
    /// original position.
    pub fn register_system<S>(&mut self, system: S)
    where
        S: System<C> + 'static,
    {
        let name = S::name();
        let replaced = self.systems.register(name, Box::new(system));
        debug!(system = name, replaced, "registered system");
    }

    /// Returns `true` if a system with this name is registered.
    #[must_use]
    pub fn has_system(&self, name: &str) -> bool {
        self.systems.contains(name)
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// System names in run order.
    pub fn system_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.names()
    }

    /// Number of ticks completed.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }
}

impl<C> Default for World<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for World<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("components", &self.components)
            .field("entities", &self.entities.len())
            .field("queries", &self.queries)
            .field("systems", &self.systems)
            .field("pending_removal", &self.pending_removal)
            .field("tick_id", &self.tick_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use miniecs_component::Component;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position(i32, i32);

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug, PartialEq)]
    struct Velocity(i32, i32);

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    struct Frozen;

    impl Component for Frozen {
        fn type_name() -> &'static str {
            "Frozen"
        }
    }

    fn members(world: &World, id: QueryId) -> Vec<String> {
        world
            .query(id)
            .map(|q| q.entities().map(|e| e.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_auto_ids_start_at_one() {
        let mut world = World::<()>::new();
        assert_eq!(world.add_entity().unwrap().id().as_str(), "1");
        assert_eq!(world.add_entity().unwrap().id().as_str(), "2");
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn test_explicit_id() {
        let mut world = World::<()>::new();
        let id = world.add_entity_with_id("player").unwrap().id().clone();
        assert!(world.contains_entity(&id));
        assert_eq!(id.as_str(), "player");
    }

    #[test]
    fn test_duplicate_explicit_id_rejected() {
        let mut world = World::<()>::new();
        world
            .add_entity_with_id("player")
            .unwrap()
            .add_component(Position(1, 1));

        let err = world.add_entity_with_id("player").unwrap_err();
        assert_eq!(err, WorldError::DuplicateEntity(EntityId::from("player")));

        let player = world.entity(&EntityId::from("player")).unwrap();
        assert_eq!(player.get_component::<Position>(), Some(&Position(1, 1)));
    }

    #[test]
    fn test_auto_ids_skip_explicit_ones() {
        let mut world = World::<()>::new();
        world.add_entity_with_id("1").unwrap();
        world.add_entity_with_id("2").unwrap();
        assert_eq!(world.add_entity().unwrap().id().as_str(), "3");
    }

    #[test]
    fn test_first_entity_id_from_config() {
        let mut world = World::<()>::with_config(WorldConfig::default().with_first_entity_id(50));
        assert_eq!(world.add_entity().unwrap().id().as_str(), "50");
    }

    #[test]
    fn test_bits_assigned_in_first_seen_order() {
        let mut world = World::<()>::new();
        world
            .add_entity()
            .unwrap()
            .add_component(Velocity(0, 0))
            .add_component(Position(0, 0));
        world.create_query(&[Frozen::kind()]);

        assert_eq!(world.component_bit(Velocity::kind()), Some(0));
        assert_eq!(world.component_bit(Position::kind()), Some(1));
        assert_eq!(world.component_bit(Frozen::kind()), Some(2));
        assert_eq!(world.register_component(Position::kind()), 1);
        assert_eq!(world.component_kind_count(), 3);
        assert_eq!(world.component_kind(2), Some(Frozen::kind()));
        assert_eq!(world.component_kind(3), None);
        assert_eq!(
            world.component_kinds().collect::<Vec<_>>(),
            vec![Velocity::kind(), Position::kind(), Frozen::kind()]
        );
    }

    #[test]
    fn test_query_scenario() {
        let mut world = World::<()>::new();
        let e1 = world
            .add_entity()
            .unwrap()
            .add_component(Position(0, 0))
            .add_component(Velocity(1, 0))
            .id()
            .clone();
        let e2 = world.add_entity().unwrap().add_component(Position(5, 5)).id().clone();

        let moving = world.create_query(&[Position::kind(), Velocity::kind()]);
        let placed = world.create_query(&[Position::kind()]);
        assert_eq!(members(&world, moving), vec![e1.to_string()]);
        assert_eq!(members(&world, placed), vec![e1.to_string(), e2.to_string()]);

        world.entity_mut(&e1).unwrap().remove_component::<Velocity>();
        assert!(members(&world, moving).is_empty());
        assert_eq!(members(&world, placed), vec![e1.to_string(), e2.to_string()]);
    }

    #[test]
    fn test_query_cache_identity() {
        let mut world = World::<()>::new();
        let a = world.create_query(&[Position::kind(), Velocity::kind()]);
        let b = world.create_query(&[Velocity::kind(), Position::kind()]);
        let c = world.create_query(&[Position::kind(), Velocity::kind(), Position::kind()]);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(world.query_count(), 1);
    }

    #[test]
    fn test_query_updated_on_later_add() {
        let mut world = World::<()>::new();
        let moving = world.create_query(&[Position::kind(), Velocity::kind()]);
        let id = world.add_entity().unwrap().add_component(Position(0, 0)).id().clone();
        assert!(world.query(moving).unwrap().is_empty());

        world.entity_mut(&id).unwrap().add_component(Velocity(1, 1));
        assert!(world.query(moving).unwrap().contains(&id));
    }

    #[test]
    fn test_empty_query_matches_all_entities() {
        let mut world = World::<()>::new();
        world.add_entity().unwrap().add_component(Position(0, 0));
        world.add_entity().unwrap();
        let all = world.create_query(&[]);
        assert_eq!(world.query(all).unwrap().len(), 2);

        world.add_entity().unwrap();
        assert_eq!(world.query(all).unwrap().len(), 3);
    }

    #[test]
    fn test_remove_absent_kind_is_noop() {
        let mut world = World::<()>::new();
        let placed = world.create_query(&[Position::kind()]);
        let id = world.add_entity().unwrap().add_component(Position(0, 0)).id().clone();

        world.entity_mut(&id).unwrap().remove_component::<Frozen>();
        let entity = world.entity(&id).unwrap();
        assert_eq!(entity.component_count(), 1);
        assert!(world.query(placed).unwrap().contains(&id));
    }

    #[test]
    fn test_removal_is_deferred_and_idempotent() {
        let mut world = World::<()>::new();
        let id = world.add_entity().unwrap().add_component(Position(0, 0)).id().clone();
        let placed = world.create_query(&[Position::kind()]);

        world.remove_entity(&id).unwrap();
        world.remove_entity(&id).unwrap();
        assert_eq!(world.pending_removal_count(), 1);
        assert!(world.entity(&id).unwrap().is_removed());
        assert!(world.query(placed).unwrap().contains(&id));
    }

    #[test]
    fn test_remove_unknown_entity() {
        let mut world = World::<()>::new();
        let missing = EntityId::from("ghost");
        assert_eq!(
            world.remove_entity(&missing),
            Err(WorldError::EntityNotFound(missing))
        );
    }

    #[test]
    fn test_new_query_scan_includes_pending_removal_by_default() {
        let mut world = World::<()>::new();
        let id = world.add_entity().unwrap().add_component(Position(0, 0)).id().clone();
        world.remove_entity(&id).unwrap();

        let placed = world.create_query(&[Position::kind()]);
        assert!(world.query(placed).unwrap().contains(&id));
    }

    #[test]
    fn test_new_query_scan_can_skip_pending_removal() {
        let config = WorldConfig::default().with_scan_pending_removal(false);
        let mut world = World::<()>::with_config(config);
        let id = world.add_entity().unwrap().add_component(Position(0, 0)).id().clone();
        world.remove_entity(&id).unwrap();

        let placed = world.create_query(&[Position::kind()]);
        assert!(world.query(placed).unwrap().is_empty());
    }

    #[test]
    fn test_pending_entity_stays_out_when_skipped() {
        let config = WorldConfig::default().with_scan_pending_removal(false);
        let mut world = World::<()>::with_config(config);
        let moving = world.create_query(&[Velocity::kind()]);
        let id = world.add_entity().unwrap().add_component(Position(0, 0)).id().clone();
        let before = world.create_query(&[Position::kind()]);
        world.remove_entity(&id).unwrap();

        let placed = world.create_query(&[Position::kind(), Frozen::kind()]);
        world
            .entity_mut(&id)
            .unwrap()
            .add_component(Velocity(1, 1))
            .add_component(Frozen);
        assert!(!world.query(placed).unwrap().contains(&id));
        assert!(!world.query(moving).unwrap().contains(&id));
        // Memberships from before the removal still follow the mask.
        assert!(world.query(before).unwrap().contains(&id));
        world.entity_mut(&id).unwrap().remove_component::<Position>();
        assert!(!world.query(before).unwrap().contains(&id));
    }

    #[test]
    fn test_auto_ids_exhausted_is_an_error() {
        let config = WorldConfig::default().with_first_entity_id(u64::MAX);
        let mut world = World::<()>::with_config(config);
        assert_eq!(
            world.add_entity().unwrap().id().as_str(),
            "18446744073709551615"
        );
        assert!(matches!(world.add_entity(), Err(WorldError::IdsExhausted)));
        assert!(world.add_entity_with_id("named").is_ok());
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn test_members_sort_as_strings() {
        let mut world = World::<()>::new();
        for _ in 0..11 {
            world.add_entity().unwrap();
        }
        let all = world.create_query(&[]);
        let ids = members(&world, all);
        assert_eq!(&ids[..4], ["1", "10", "11", "2"]);
    }

    #[test]
    fn test_query_entities_yields_views() {
        let mut world = World::<()>::new();
        world
            .add_entity()
            .unwrap()
            .add_component(Position(1, 2))
            .add_component(Velocity(3, 4));
        world.add_entity().unwrap().add_component(Position(0, 0));

        let moving = world.create_query(&[Position::kind(), Velocity::kind()]);
        let velocities: Vec<_> = world
            .query_entities(moving)
            .filter_map(|e| e.get_component::<Velocity>())
            .collect();
        assert_eq!(velocities, vec![&Velocity(3, 4)]);
    }
}
