//! World error types.

use miniecs_component::EntityId;

/// Errors reported by [`World`](crate::World) operations.
///
/// Legitimate absences (a missing component, a repeated removal) are not
/// errors; these variants only cover misuse of the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// An explicit entity id collided with an entity still in the table.
    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),

    /// The entity is not in the table (never created, or already purged).
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// The automatic id counter has handed out its last value.
    #[error("automatic entity ids exhausted")]
    IdsExhausted,

    /// [`World::tick`](crate::World::tick) was called from inside a system.
    #[error("tick called while a tick is already running")]
    NestedTick,
}

/// Shorthand for results carrying a [`WorldError`].
pub type Result<T> = std::result::Result<T, WorldError>;
