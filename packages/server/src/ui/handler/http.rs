//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{
        CreateRoomResponse, DecryptResponse, EncryptResponse, RoomDetailDto, RoomSummaryDto,
        TranscodeRequest,
    },
    ui::state::AppState,
    usecase::GetRoomDetailError,
};

/// Create a new room and return its shareable link
pub async fn create_room(State(state): State<Arc<AppState>>) -> Json<CreateRoomResponse> {
    let link = state.create_room_usecase.execute().await;
    Json(CreateRoomResponse {
        room_id: link.to_string(),
    })
}

/// Obscure a plaintext message (same transform as chat messages)
pub async fn encrypt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranscodeRequest>,
) -> Result<Json<EncryptResponse>, (StatusCode, String)> {
    match state.transcode_message_usecase.encode(&request.message) {
        Ok(encrypted) => Ok(Json(EncryptResponse { encrypted })),
        Err(e) => {
            tracing::error!("Failed to obscure message: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Reveal an obscured token
pub async fn decrypt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranscodeRequest>,
) -> Result<Json<DecryptResponse>, (StatusCode, String)> {
    match state.transcode_message_usecase.decode(&request.message) {
        Ok(decrypted) => Ok(Json(DecryptResponse { decrypted })),
        Err(e) => {
            tracing::warn!("Failed to reveal token: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of active rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get members and recent history of a room
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_room_detail_usecase.execute(&room_id).await {
        Ok(snapshot) => Ok(Json(snapshot.into())),
        Err(GetRoomDetailError::InvalidRoomId(_)) => Err(StatusCode::BAD_REQUEST),
        Err(GetRoomDetailError::RoomNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(GetRoomDetailError::RoomClosed(_)) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
