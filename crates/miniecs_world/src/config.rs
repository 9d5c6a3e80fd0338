//! World configuration.

use serde::Deserialize;

/// Configuration for a [`World`](crate::World).
///
/// Every field has a default, so a partial config file only needs to name
/// the fields it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Initial capacity of the entity table.
    pub entity_capacity: usize,
    /// Initial capacity of the query cache.
    pub query_capacity: usize,
    /// First value handed out by the automatic id counter.
    pub first_entity_id: u64,
    /// Whether entities pending removal may join a query, either through the
    /// scan run when the query is created or through a later component
    /// change. They drop out at the next tick either way.
    pub scan_pending_removal: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 0,
            query_capacity: 0,
            first_entity_id: 1,
            scan_pending_removal: true,
        }
    }
}

impl WorldConfig {
    /// Preallocate room for `entities` entities.
    #[must_use]
    pub fn with_entity_capacity(mut self, entities: usize) -> Self {
        self.entity_capacity = entities;
        self
    }

    /// Preallocate room for `queries` cached queries.
    #[must_use]
    pub fn with_query_capacity(mut self, queries: usize) -> Self {
        self.query_capacity = queries;
        self
    }

    /// Start the automatic id counter at `first`.
    #[must_use]
    pub fn with_first_entity_id(mut self, first: u64) -> Self {
        self.first_entity_id = first;
        self
    }

    /// Choose whether new queries include entities pending removal.
    #[must_use]
    pub fn with_scan_pending_removal(mut self, include: bool) -> Self {
        self.scan_pending_removal = include;
        self
    }
}
