//! Error types for the room runtime.

use thiserror::Error;

use crate::domain::RoomId;

/// The room no longer accepts events (destroyed or crashed)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room is closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("room id '{0}' is already registered")]
    DuplicateRoomId(RoomId),
}
