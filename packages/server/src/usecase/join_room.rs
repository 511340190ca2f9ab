//! UseCase: ルーム参加前の検証とルームの解決
//!
//! WebSocket の upgrade 前に呼ばれ、失敗した場合は状態を一切作らない。

use std::sync::Arc;

use hanare_shared::time::Clock;

use crate::{
    domain::{RoomLink, Timestamp},
    room::{RoomHandle, RoomRegistry},
};

use super::error::JoinRoomError;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(registry: Arc<RoomRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// リンク（`xxx-xxxx-xxx?hs=NNN`）から参加可能なルームを解決する
    ///
    /// # Returns
    ///
    /// * `Ok(RoomHandle)` - 参加可能なルーム
    /// * `Err(JoinRoomError::InvalidRoomLink)` - リンクの形式が不正
    /// * `Err(JoinRoomError::RoomNotFound)` - 未登録、期限切れ、または停止済み
    pub async fn execute(&self, link: &str) -> Result<RoomHandle, JoinRoomError> {
        let link = RoomLink::parse(link)
            .map_err(|_| JoinRoomError::InvalidRoomLink(link.to_string()))?;
        let not_found = || JoinRoomError::RoomNotFound(link.room_id().to_string());

        let room = self
            .registry
            .get(link.room_id())
            .await
            .ok_or_else(not_found)?;

        // 期限切れのルームは sweep 前でも参加を拒否する
        let now = Timestamp::new(self.clock.now_millis());
        if room.is_expired(now) || room.is_closed() {
            return Err(not_found());
        }

        Ok(room)
    }
}
