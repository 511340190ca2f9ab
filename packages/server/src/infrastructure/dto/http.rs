//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::ServerMessage;

/// Response of `/create-room`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    #[serde(rename = "roomID")]
    pub room_id: String,
}

/// Body of `/encrypt` and `/decrypt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptResponse {
    pub encrypted: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub decrypted: String,
}

/// Room entry of `/api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub created_at: String,
    pub expires_at: String,
}

/// Member entry of `/api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub username: String,
    pub color: String,
}

/// Response of `/api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub member_count: usize,
    pub members: Vec<MemberDto>,
    pub history: Vec<ServerMessage>,
    pub created_at: String,
    pub expires_at: String,
}
