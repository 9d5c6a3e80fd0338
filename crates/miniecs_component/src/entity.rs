//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is an opaque string. Hosts may pick their own ids (e.g.
//! `"player"`) or let an [`EntityAllocator`] hand out decimal ids counting up
//! from 1.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique entity identifier.
///
/// Entities are pure identifiers: they carry no data of their own.
/// Components are attached to them to give them meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Allocates monotonically increasing entity ids rendered as decimal strings.
///
/// The allocator never checks for collisions; the world skips ids that are
/// already taken. Once `u64::MAX` has been handed out the allocator is
/// exhausted and returns `None`.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: Option<u64>,
    allocated: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates an allocator whose first id is `first`.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next_id: Some(first),
            allocated: 0,
        }
    }

    /// Allocates a fresh entity id, or `None` once the counter is exhausted.
    pub fn allocate(&mut self) -> Option<EntityId> {
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        self.allocated = self.allocated.saturating_add(1);
        Some(EntityId(id.to_string()))
    }

    /// Returns `true` once every id up to `u64::MAX` has been handed out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next_id.is_none()
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.allocated
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
