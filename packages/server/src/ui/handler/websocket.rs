//! WebSocket connection handlers (session bootstrap).

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{MemberProfile, SessionId},
    room::{RoomHandle, SessionEntry},
    ui::{
        pump::{self, Session},
        state::AppState,
    },
    usecase::JoinRoomError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Full room link, `xxx-xxxx-xxx?hs=NNN` (percent-encoded)
    pub room: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(link) = query.room.filter(|link| !link.is_empty()) else {
        tracing::warn!("WebSocket request without room parameter");
        return Err(StatusCode::BAD_REQUEST);
    };

    // 失敗した場合は upgrade もセッションの作成も行わない
    let room = match state.join_room_usecase.execute(&link).await {
        Ok(room) => room,
        Err(JoinRoomError::InvalidRoomLink(_)) => {
            tracing::warn!("Invalid room link: '{}'", link);
            return Err(StatusCode::BAD_REQUEST);
        }
        Err(JoinRoomError::RoomNotFound(id)) => {
            tracing::warn!("Room '{}' not found", id);
            return Err(StatusCode::NOT_FOUND);
        }
    };

    let max_frame_bytes = state.pump_config.max_frame_bytes;
    Ok(ws
        .max_message_size(max_frame_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state, room)))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, room: RoomHandle) {
    let (outbox_tx, outbox_rx) = mpsc::channel(state.outbox_capacity.max(1));
    let session = Session {
        id: SessionId::generate(),
        cancel: room.session_scope(),
        room,
    };
    let profile = MemberProfile::generate();
    let nickname = profile.nickname.clone();

    let entry = SessionEntry {
        id: session.id,
        profile,
        outbox: outbox_tx,
        cancel: session.cancel.clone(),
    };
    if session.room.join(entry).await.is_err() {
        // 参加直前にルームが停止した
        tracing::warn!(
            room = %session.room.id(),
            "Room closed before session could join"
        );
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    tracing::info!(
        room = %session.room.id(),
        session = %session.id,
        "Client '{}' connected",
        nickname
    );

    let room_id = session.room.id().clone();
    let session_id = session.id;
    pump::run(
        socket,
        session,
        outbox_rx,
        state.transcode_message_usecase.clone(),
        state.pump_config.clone(),
    )
    .await;

    tracing::info!(room = %room_id, session = %session_id, "Client '{}' disconnected", nickname);
}
