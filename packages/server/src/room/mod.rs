//! Room runtime: one actor task per room, and the registry of active rooms.
//!
//! Sessions never touch room state directly. They hold a [`RoomHandle`]
//! and send events to the room's inbox; the [`RoomActor`] is the only
//! owner of membership and history.

mod actor;
mod error;
mod event;
mod handle;
mod registry;

pub use actor::RoomActor;
pub use error::{RegistryError, RoomError};
pub use event::{RoomEvent, RoomSnapshot, SessionEntry};
pub use handle::RoomHandle;
pub use registry::RoomRegistry;
