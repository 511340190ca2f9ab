//! Capability for talking to a room actor.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::domain::{RoomId, RoomLink, SessionId, Timestamp};

use super::{RoomError, RoomEvent, RoomSnapshot, SessionEntry};

/// Cloneable handle to a running room.
///
/// Every operation is a message to the actor's inbox. Sends give up as soon
/// as the room's cancellation scope fires, so callers never wait on a
/// room that is being torn down.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    link: RoomLink,
    created_at: Timestamp,
    expires_at: Timestamp,
    inbox: mpsc::Sender<RoomEvent>,
    cancel: CancellationToken,
}

impl RoomHandle {
    pub(super) fn new(
        link: RoomLink,
        created_at: Timestamp,
        expires_at: Timestamp,
        inbox: mpsc::Sender<RoomEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            link,
            created_at,
            expires_at,
            inbox,
            cancel,
        }
    }

    pub fn id(&self) -> &RoomId {
        self.link.room_id()
    }

    pub fn link(&self) -> &RoomLink {
        &self.link
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// The actor has stopped or is stopping
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.inbox.is_closed()
    }

    /// Cancel the room scope; the actor and every session in it stop
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// New cancellation scope for a session of this room
    pub fn session_scope(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub async fn join(&self, entry: SessionEntry) -> Result<(), RoomError> {
        self.send(RoomEvent::Join(entry)).await
    }

    pub async fn leave(&self, session_id: SessionId) -> Result<(), RoomError> {
        self.send(RoomEvent::Leave(session_id)).await
    }

    pub async fn post(&self, from: SessionId, text: String) -> Result<(), RoomError> {
        self.send(RoomEvent::Post { from, text }).await
    }

    pub async fn typing(&self, from: SessionId, typing: bool) -> Result<(), RoomError> {
        self.send(RoomEvent::Typing { from, typing }).await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply, response) = oneshot::channel();
        self.send(RoomEvent::Snapshot(reply)).await?;
        tokio::select! {
            snapshot = response => snapshot.map_err(|_| RoomError::Closed),
            _ = self.cancel.cancelled() => Err(RoomError::Closed),
        }
    }

    async fn send(&self, event: RoomEvent) -> Result<(), RoomError> {
        if self.cancel.is_cancelled() {
            return Err(RoomError::Closed);
        }
        tokio::select! {
            sent = self.inbox.send(event) => sent.map_err(|_| RoomError::Closed),
            _ = self.cancel.cancelled() => Err(RoomError::Closed),
        }
    }
}
