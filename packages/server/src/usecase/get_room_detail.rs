//! UseCase: ルーム詳細（メンバーと直近の履歴）の取得
//!
//! 詳細はルームアクターへの Snapshot イベントで取得するため、
//! アクターの処理順序を追い越すことはない。

use std::sync::Arc;

use hanare_shared::time::Clock;

use crate::{
    domain::{RoomId, Timestamp},
    room::{RoomRegistry, RoomSnapshot},
};

use super::error::GetRoomDetailError;

pub struct GetRoomDetailUseCase {
    registry: Arc<RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<RoomRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// # Arguments
    ///
    /// * `room_id` - ベース ID（`xxx-xxxx-xxx`、`?hs=` 部分は含まない）
    pub async fn execute(&self, room_id: &str) -> Result<RoomSnapshot, GetRoomDetailError> {
        let id = RoomId::new(room_id.to_string())
            .map_err(|_| GetRoomDetailError::InvalidRoomId(room_id.to_string()))?;

        let room = self
            .registry
            .get(&id)
            .await
            .ok_or_else(|| GetRoomDetailError::RoomNotFound(id.to_string()))?;

        let now = Timestamp::new(self.clock.now_millis());
        if room.is_expired(now) {
            return Err(GetRoomDetailError::RoomNotFound(id.to_string()));
        }

        room.snapshot()
            .await
            .map_err(|_| GetRoomDetailError::RoomClosed(id.to_string()))
    }
}
