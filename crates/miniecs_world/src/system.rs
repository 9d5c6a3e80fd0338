//! Systems and the per-tick payload handed to them.

use crate::world::World;

/// Per-tick logic driven by [`World::tick`].
///
/// `C` is the payload type shared by every system in a world; each tick the
/// same `&C` is passed to every system, in registration order. A world holds
/// at most one system per [`System::name`].
///
/// # Examples
///
/// ```rust
/// use miniecs_world::{System, TickContext, World};
///
/// struct Counter(u32);
///
/// impl System<TickContext> for Counter {
///     fn name() -> &'static str { "counter" }
///
///     fn update(&mut self, _world: &mut World<TickContext>, _ctx: &TickContext) {
///         self.0 += 1;
///     }
/// }
///
/// let mut world = World::<TickContext>::new();
/// world.register_system(Counter(0));
/// world.tick(&TickContext::new(1.0 / 60.0)).unwrap();
/// ```
pub trait System<C = ()> {
    /// The system kind. Registering a second system with the same name
    /// replaces the first.
    fn name() -> &'static str
    where
        Self: Sized;

    /// Run one tick. Entity removals requested here take effect once every
    /// system has run.
    fn update(&mut self, world: &mut World<C>, ctx: &C);
}

/// Ready-made tick payload for hosts that only need a frame delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Delta time since the last tick, in seconds.
    pub dt: f64,
}

impl TickContext {
    /// Create a context for a tick of length `dt` seconds.
    #[must_use]
    pub fn new(dt: f64) -> Self {
        Self { dt }
    }
}
