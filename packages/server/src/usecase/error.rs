//! UseCase 層のエラー定義

use thiserror::Error;

/// ルーム参加（Session Bootstrap）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("invalid room link: {0}")]
    InvalidRoomLink(String),
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("invalid room id: {0}")]
    InvalidRoomId(String),
    #[error("room '{0}' not found")]
    RoomNotFound(String),
    #[error("room '{0}' is closed")]
    RoomClosed(String),
}
