//! Conversion logic between domain entities and DTOs.

use hanare_shared::time::timestamp_to_rfc3339;

use crate::domain::{entity, value_object::Timestamp};
use crate::infrastructure::dto::{http, websocket as dto};
use crate::room::{RoomHandle, RoomSnapshot};

fn rfc3339(timestamp: Timestamp) -> String {
    timestamp_to_rfc3339(timestamp.value())
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<entity::MessageKind> for dto::MessageType {
    fn from(kind: entity::MessageKind) -> Self {
        match kind {
            entity::MessageKind::Chat => Self::Chat,
            entity::MessageKind::UserCount => Self::UserCount,
            entity::MessageKind::Typing => Self::Typing,
        }
    }
}

impl From<&entity::ChatMessage> for dto::ServerMessage {
    fn from(model: &entity::ChatMessage) -> Self {
        Self {
            r#type: model.kind.into(),
            username: model.author.as_ref().map(|a| a.nickname.to_string()),
            message: model.payload.clone(),
            timestamp: rfc3339(model.timestamp),
            color: model.author.as_ref().map(|a| a.color.as_str().to_string()),
            typing: model.typing,
        }
    }
}

impl From<&entity::MemberProfile> for http::MemberDto {
    fn from(model: &entity::MemberProfile) -> Self {
        Self {
            username: model.nickname.to_string(),
            color: model.color.as_str().to_string(),
        }
    }
}

impl From<RoomSnapshot> for http::RoomDetailDto {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.to_string(),
            member_count: snapshot.member_count(),
            members: snapshot.members.iter().map(Into::into).collect(),
            history: snapshot.history.iter().map(Into::into).collect(),
            created_at: rfc3339(snapshot.created_at),
            expires_at: rfc3339(snapshot.expires_at),
        }
    }
}

impl From<&RoomHandle> for http::RoomSummaryDto {
    fn from(room: &RoomHandle) -> Self {
        Self {
            id: room.id().to_string(),
            created_at: rfc3339(room.created_at()),
            expires_at: rfc3339(room.expires_at()),
        }
    }
}
