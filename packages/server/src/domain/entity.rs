//! Domain entities: messages, member profiles and room history.

use std::time::Duration;

use super::{Color, Nickname, Timestamp};

/// Kind of event delivered to room members
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Chat,
    UserCount,
    Typing,
}

/// Display identity of a room member, fixed for the session lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub nickname: Nickname,
    pub color: Color,
}

impl MemberProfile {
    pub fn new(nickname: Nickname, color: Color) -> Self {
        Self { nickname, color }
    }

    /// Random nickname and color
    pub fn generate() -> Self {
        Self::new(Nickname::generate(), Color::generate())
    }
}

/// A message broadcast by a room. Immutable once built.
///
/// - `Chat`: `payload` holds the obscured token
/// - `UserCount`: `payload` holds the member count as plain text
/// - `Typing`: no payload, `typing` carries the flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub author: Option<MemberProfile>,
    pub payload: Option<String>,
    pub timestamp: Timestamp,
    pub typing: bool,
}

impl ChatMessage {
    pub fn chat(author: MemberProfile, token: String, timestamp: Timestamp) -> Self {
        Self {
            kind: MessageKind::Chat,
            author: Some(author),
            payload: Some(token),
            timestamp,
            typing: false,
        }
    }

    pub fn user_count(count: usize, timestamp: Timestamp) -> Self {
        Self {
            kind: MessageKind::UserCount,
            author: None,
            payload: Some(count.to_string()),
            timestamp,
            typing: false,
        }
    }

    pub fn typing(author: MemberProfile, typing: bool, timestamp: Timestamp) -> Self {
        Self {
            kind: MessageKind::Typing,
            author: Some(author),
            payload: None,
            timestamp,
            typing,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.nickname.as_str())
    }
}

/// Ordered chat history of one room (arrival order)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    messages: Vec<ChatMessage>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Keep only messages younger than `retention` at `now`.
    ///
    /// Each message's age is evaluated on its own, so out-of-order timestamps
    /// may leave gaps. Relative order of retained messages is unchanged.
    /// Returns the number of removed messages.
    pub fn retain_recent(&mut self, now: Timestamp, retention: Duration) -> usize {
        let before = self.messages.len();
        self.messages
            .retain(|message| message.timestamp.age_at(now) < retention);
        before - self.messages.len()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
