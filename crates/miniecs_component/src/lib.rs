//! # miniecs_component
//!
//! The building blocks shared by every part of the ECS: what a component is,
//! how entities are named, and the bit masks used to match them.
//!
//! This crate provides:
//!
//! - [`Component`] trait and [`ComponentKind`]: compile-time component tags.
//! - [`EntityId`]: opaque string entity identifiers.
//! - [`EntityAllocator`]: monotonically increasing id allocator.
//! - [`Bitmask`]: growable bit set with subset testing and canonical keys.

pub mod bitmask;
pub mod component;
pub mod entity;

pub use bitmask::Bitmask;
pub use component::{Component, ComponentKind};
pub use entity::{EntityAllocator, EntityId};
