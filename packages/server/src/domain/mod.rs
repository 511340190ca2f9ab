//! Domain layer for the chat server.
//!
//! This module contains business rules that are independent of
//! the wire format, the transport and the room actor runtime.

pub mod codec;
pub mod entity;
pub mod error;
pub mod value_object;

pub use codec::MessageCodec;
#[cfg(test)]
pub use codec::MockMessageCodec;
pub use entity::{ChatMessage, History, MemberProfile, MessageKind};
pub use error::{CodecError, ValueObjectError};
pub use value_object::{
    Color, Nickname, RoomId, RoomIdFactory, RoomLink, SessionId, Timestamp,
};
