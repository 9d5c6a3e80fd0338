//! # miniecs_world
//!
//! The registry half of the ECS: a [`World`] owns entities, hands out a bit
//! per component kind, caches queries, and drives systems once per tick.
//!
//! ## Query maintenance
//!
//! A query is created once per distinct set of component kinds and is kept
//! current incrementally: every component added to or removed from an entity
//! re-evaluates that entity against each cached query before the call
//! returns. Reads never scan.
//!
//! ## Removal
//!
//! [`World::remove_entity`] only marks an entity. It stays visible in the
//! table and in every query until the next [`World::tick`] finishes running
//! systems, at which point it is purged.
//!
//! ```rust
//! use miniecs_component::Component;
//! use miniecs_world::World;
//!
//! struct Position(f32, f32);
//! impl Component for Position {
//!     fn type_name() -> &'static str { "Position" }
//! }
//!
//! let mut world = World::<()>::new();
//! let id = world.add_entity().unwrap().add_component(Position(0.0, 0.0)).id().clone();
//! let placed = world.create_query(&[Position::kind()]);
//! assert!(world.query(placed).unwrap().contains(&id));
//!
//! world.remove_entity(&id).unwrap();
//! assert!(world.query(placed).unwrap().contains(&id));
//! world.tick(&()).unwrap();
//! assert!(world.query(placed).unwrap().is_empty());
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod query;
pub mod registry;
pub mod system;
pub mod tick;
pub mod world;

pub use config::WorldConfig;
pub use entity::{EntityMut, EntityRef};
pub use error::{Result, WorldError};
pub use query::{ListenerId, Query, QueryEvent, QueryId};
pub use system::{System, TickContext};
pub use tick::TickSummary;
pub use world::World;
