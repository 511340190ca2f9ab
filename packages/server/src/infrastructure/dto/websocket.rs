//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// `type` field of frames sent to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Chat,
    UserCount,
    Typing,
}

/// One message pushed to a client.
///
/// Several of these may share a single text frame, each terminated by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub r#type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// RFC 3339, UTC
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub typing: bool,
}

/// `type` field of frames received from clients.
///
/// Anything other than `typing` is a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMessageType {
    Typing,
    #[serde(other)]
    Chat,
}

/// One frame received from a client.
///
/// `username`, `color` and `timestamp` sent by clients are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientMessage {
    pub r#type: ClientMessageType,
    /// Obscured token for chat frames
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub typing: bool,
}
