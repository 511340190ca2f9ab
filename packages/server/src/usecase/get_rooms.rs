//! UseCase: アクティブなルーム一覧の取得

use std::sync::Arc;

use hanare_shared::time::Clock;

use crate::{
    domain::Timestamp,
    room::{RoomHandle, RoomRegistry},
};

pub struct GetRoomsUseCase {
    registry: Arc<RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<RoomRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// 参加可能なルームを作成時刻順に返す（sweep 待ちの期限切れルームは除く）
    pub async fn execute(&self) -> Vec<RoomHandle> {
        let now = Timestamp::new(self.clock.now_millis());
        self.registry
            .rooms()
            .await
            .into_iter()
            .filter(|room| !room.is_expired(now) && !room.is_closed())
            .collect()
    }
}
