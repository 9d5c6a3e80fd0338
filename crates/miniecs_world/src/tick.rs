//! The world tick.
//!
//! One tick has two phases:
//!
//! 1. Run every registered system, in registration order, with the same
//!    payload.
//! 2. Purge every entity marked for removal from all queries and from the
//!    entity table.
//!
//! Systems therefore see a stable entity table for the whole tick: removals
//! they request only become visible once every system has run.

use tracing::debug;

use crate::error::{Result, WorldError};
use crate::world::World;

/// What a call to [`World::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick counter after this tick (the first tick is 1).
    pub tick_id: u64,
    /// Number of systems that ran.
    pub systems_run: usize,
    /// Number of entities purged.
    pub purged: usize,
}

impl<C> World<C> {
    /// Run one tick: every system's `update` in registration order, then
    /// the deferred-removal purge.
    ///
    /// Systems registered while the tick runs are added afterwards and first
    /// run on the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NestedTick`] if called from inside a system.
    pub fn tick(&mut self, ctx: &C) -> Result<TickSummary> {
        if self.in_tick {
            return Err(WorldError::NestedTick);
        }
        self.in_tick = true;
        self.tick_id += 1;

        let mut systems = std::mem::take(&mut self.systems);
        let systems_run = systems.len();
        for system in systems.iter_mut() {
            system.update(self, ctx);
        }
        let registered_during_tick = std::mem::replace(&mut self.systems, systems);
        self.systems.merge(registered_during_tick);

        let purged = self.purge_removed();
        self.in_tick = false;

        debug!(
            tick_id = self.tick_id,
            systems = systems_run,
            purged,
            "tick complete"
        );

        Ok(TickSummary {
            tick_id: self.tick_id,
            systems_run,
            purged,
        })
    }

    /// Remove every pending entity from all queries and the table.
    fn purge_removed(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_removal);
        let mut purged = 0;
        for id in pending {
            self.queries.purge(&id);
            if self.entities.remove(&id).is_some() {
                purged += 1;
            }
        }
        purged
    }
}
