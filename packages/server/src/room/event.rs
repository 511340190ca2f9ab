//! Events delivered to a room actor's inbox.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::domain::{ChatMessage, MemberProfile, RoomId, SessionId, Timestamp};

/// Everything the room needs to own a newly joined session
#[derive(Debug)]
pub struct SessionEntry {
    pub id: SessionId,
    pub profile: MemberProfile,
    /// Producer side of the session outbox; the outbound pump holds the receiver
    pub outbox: mpsc::Sender<ChatMessage>,
    /// Session cancellation scope (child of the room scope)
    pub cancel: CancellationToken,
}

#[derive(Debug)]
pub enum RoomEvent {
    Join(SessionEntry),
    Leave(SessionId),
    /// Plaintext chat message from a member; the room obscures it
    Post { from: SessionId, text: String },
    Typing { from: SessionId, typing: bool },
    Snapshot(oneshot::Sender<RoomSnapshot>),
}

/// Point-in-time copy of a room's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    /// Sorted by nickname
    pub members: Vec<MemberProfile>,
    pub history: Vec<ChatMessage>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl RoomSnapshot {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
