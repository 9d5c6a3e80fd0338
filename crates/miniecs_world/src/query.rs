//! Cached queries and their membership notifications.
//!
//! A [`Query`] is a live view: a target [`Bitmask`] plus the ids of every
//! entity whose mask is currently a superset of it. The world keeps every
//! query it has created in a [`QueryCache`] and updates membership as
//! entities gain or lose components, so reading a query never scans.
//!
//! Membership changes are reported to listeners as [`QueryEvent`]s,
//! synchronously and in subscription order.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use miniecs_component::{Bitmask, EntityId};
use tracing::trace;

use crate::entity::EntityRecord;

/// Handle to a query cached in a [`World`](crate::World).
///
/// Only meaningful for the world that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryId(usize);

impl QueryId {
    /// Returns the raw index of this query in its world's cache.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Handle returned by [`Query::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A change in a query's result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    /// The entity entered the result set.
    Matched(EntityId),
    /// The entity left the result set.
    Unmatched(EntityId),
}

impl QueryEvent {
    /// The entity the event is about.
    #[must_use]
    pub fn entity(&self) -> &EntityId {
        match self {
            Self::Matched(id) | Self::Unmatched(id) => id,
        }
    }
}

type Listener = Box<dyn FnMut(&QueryEvent)>;

/// A cached set of entities matching a component mask.
pub struct Query {
    mask: Bitmask,
    key: String,
    entities: BTreeSet<EntityId>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl Query {
    /// Create an empty query for `mask`.
    #[must_use]
    pub fn new(mask: Bitmask) -> Self {
        let key = mask.to_canonical_key();
        Self {
            mask,
            key,
            entities: BTreeSet::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// The component mask an entity must cover to be a member.
    #[must_use]
    pub fn mask(&self) -> &Bitmask {
        &self.mask
    }

    /// The cache key, the canonical rendering of [`Query::mask`].
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns `true` if an entity with mask `entity_mask` belongs here.
    #[must_use]
    pub fn matches(&self, entity_mask: &Bitmask) -> bool {
        self.mask.difference_size(entity_mask) == 0
    }

    /// Returns `true` if `id` is currently a member.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains(id)
    }

    /// Member ids in lexicographic string order (`"10"` sorts before `"2"`).
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.entities.iter()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the query has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Register a listener for membership changes.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&QueryEvent) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn add_entity(&mut self, id: EntityId) {
        if self.entities.insert(id.clone()) {
            trace!(query = %self.key, entity = %id, "entity matched");
            self.notify(&QueryEvent::Matched(id));
        }
    }

    pub(crate) fn remove_entity(&mut self, id: &EntityId) {
        if self.entities.remove(id) {
            trace!(query = %self.key, entity = %id, "entity unmatched");
            self.notify(&QueryEvent::Unmatched(id.clone()));
        }
    }

    fn notify(&mut self, event: &QueryEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("key", &self.key)
            .field("entities", &self.entities)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Every query a world has created, addressable by [`QueryId`] or key.
#[derive(Debug)]
pub(crate) struct QueryCache {
    queries: Vec<Query>,
    by_key: HashMap<String, QueryId>,
    /// Whether entities pending removal may join a query.
    admit_pending: bool,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_capacity(0, true)
    }
}

impl QueryCache {
    pub(crate) fn with_capacity(capacity: usize, admit_pending: bool) -> Self {
        Self {
            queries: Vec::with_capacity(capacity),
            by_key: HashMap::with_capacity(capacity),
            admit_pending,
        }
    }

    /// Whether `record` may be added to a query it matches.
    pub(crate) fn admits(&self, record: &EntityRecord) -> bool {
        self.admit_pending || !record.removed
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<QueryId> {
        self.by_key.get(key).copied()
    }

    pub(crate) fn insert(&mut self, query: Query) -> QueryId {
        let id = QueryId(self.queries.len());
        self.by_key.insert(query.key.clone(), id);
        self.queries.push(query);
        id
    }

    pub(crate) fn get(&self, id: QueryId) -> Option<&Query> {
        self.queries.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: QueryId) -> Option<&mut Query> {
        self.queries.get_mut(id.0)
    }

    pub(crate) fn len(&self) -> usize {
        self.queries.len()
    }

    /// Re-evaluate every query against the entity's current mask.
    ///
    /// An entity pending removal can still leave queries, but only joins
    /// one when pending entities are admitted.
    pub(crate) fn update_entity(&mut self, record: &EntityRecord) {
        let admitted = self.admits(record);
        for query in &mut self.queries {
            let matches = query.matches(&record.mask);
            let member = query.contains(&record.id);
            if matches && !member && admitted {
                query.add_entity(record.id.clone());
            } else if !matches && member {
                query.remove_entity(&record.id);
            }
        }
    }

    /// Drop the entity from every query, whether or not it still matches.
    pub(crate) fn purge(&mut self, id: &EntityId) {
        for query in &mut self.queries {
            query.remove_entity(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn mask(bits: &[usize]) -> Bitmask {
        bits.iter().copied().collect()
    }

    #[test]
    fn test_key_is_canonical() {
        let query = Query::new(mask(&[2, 0]));
        assert_eq!(query.key(), "{0,2}");
    }

    #[test]
    fn test_matches_supersets_only() {
        let query = Query::new(mask(&[0, 1]));
        assert!(query.matches(&mask(&[0, 1])));
        assert!(query.matches(&mask(&[0, 1, 5])));
        assert!(!query.matches(&mask(&[0])));
        assert!(!query.matches(&Bitmask::new()));
    }

    #[test]
    fn test_empty_mask_matches_everything() {
        let query = Query::new(Bitmask::new());
        assert!(query.matches(&Bitmask::new()));
        assert!(query.matches(&mask(&[3])));
    }

    #[test]
    fn test_listeners_see_membership_changes_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut query = Query::new(mask(&[0]));

        let first = Rc::clone(&log);
        query.subscribe(move |event| first.borrow_mut().push(("first", event.clone())));
        let second = Rc::clone(&log);
        query.subscribe(move |event| second.borrow_mut().push(("second", event.clone())));

        let id = EntityId::from("1");
        query.add_entity(id.clone());
        query.remove_entity(&id);

        assert_eq!(
            *log.borrow(),
            vec![
                ("first", QueryEvent::Matched(id.clone())),
                ("second", QueryEvent::Matched(id.clone())),
                ("first", QueryEvent::Unmatched(id.clone())),
                ("second", QueryEvent::Unmatched(id)),
            ]
        );
    }

    #[test]
    fn test_removing_non_member_is_silent() {
        let count = Rc::new(RefCell::new(0));
        let mut query = Query::new(mask(&[0]));
        let seen = Rc::clone(&count);
        query.subscribe(move |_| *seen.borrow_mut() += 1);

        query.remove_entity(&EntityId::from("missing"));
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut query = Query::new(mask(&[0]));
        let seen = Rc::clone(&count);
        let listener = query.subscribe(move |_| *seen.borrow_mut() += 1);

        query.add_entity(EntityId::from("1"));
        assert!(query.unsubscribe(listener));
        assert!(!query.unsubscribe(listener));
        query.add_entity(EntityId::from("2"));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(query.listener_count(), 0);
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_cache_lookup_by_key() {
        let mut cache = QueryCache::default();
        let id = cache.insert(Query::new(mask(&[1, 0])));
        assert_eq!(cache.lookup("{0,1}"), Some(id));
        assert_eq!(cache.lookup("{0}"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(id).map(Query::key), Some("{0,1}"));
    }
}
