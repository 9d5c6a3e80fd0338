//! Component definitions used by the demos.
//!
//! Each type implements [`Component`] with a stable `type_name`, which is
//! what the world keys bits and storage on. All of them also derive
//! `Serialize`/`Deserialize` so a host can load initial state from JSON.

use miniecs_component::Component;
use serde::{Deserialize, Serialize};

/// A 2D position in world units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Move by `velocity` over `dt` seconds.
    pub fn advance(&mut self, velocity: &Velocity, dt: f64) {
        self.x += velocity.dx * dt;
        self.y += velocity.dy * dt;
    }
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

/// A 2D velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Create a new velocity.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

/// Current and maximum hit points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    /// Create a health component at full HP.
    #[must_use]
    pub const fn full(max: f64) -> Self {
        Self { current: max, max }
    }

    /// Returns `true` while HP is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Apply damage, clamping to zero.
    pub fn damage(&mut self, amount: f64) {
        self.current = (self.current - amount).max(0.0);
    }

    /// Heal, clamping to max.
    pub fn heal(&mut self, amount: f64) {
        self.current = (self.current + amount).min(self.max);
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }
}

/// Display name, for logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Name {
    pub value: String,
}

impl Name {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { value: name.into() }
    }
}

impl Component for Name {
    fn type_name() -> &'static str {
        "Name"
    }
}
