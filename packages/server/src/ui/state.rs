//! Shared application state.

use std::sync::Arc;

use crate::{
    config::PumpConfig,
    usecase::{
        CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        TranscodeMessageUseCase,
    },
};

/// State shared by every handler
pub struct AppState {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// JoinRoomUseCase（参加先ルーム解決のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// TranscodeMessageUseCase（obscure / reveal のユースケース）
    pub transcode_message_usecase: Arc<TranscodeMessageUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// Capacity of each session outbox
    pub outbox_capacity: usize,
    pub pump_config: PumpConfig,
}
