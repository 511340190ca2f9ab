//! UseCase: 期限切れルームの定期削除

use std::{sync::Arc, time::Duration};

use hanare_shared::time::Clock;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{RoomId, Timestamp},
    room::RoomRegistry,
};

/// 期限切れルーム削除のユースケース
pub struct SweepExpiredRoomsUseCase {
    registry: Arc<RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl SweepExpiredRoomsUseCase {
    pub fn new(registry: Arc<RoomRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// 期限切れ（または停止済み）のルームを Registry から外して停止させる
    ///
    /// ルームのキャンセルにより、所属する全セッションも切断される。
    pub async fn execute(&self) -> Vec<RoomId> {
        let now = Timestamp::new(self.clock.now_millis());
        let retired = self.registry.retire_expired(now).await;
        for id in &retired {
            tracing::info!(room = %id, "Room retired");
        }
        retired
    }

    /// `interval` ごとに [`Self::execute`] を実行する。`cancel` で終了する。
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let retired = self.execute().await;
                    tracing::debug!(
                        "Room sweep finished: {} retired, {} active",
                        retired.len(),
                        self.registry.len().await
                    );
                }
            }
        }

        tracing::info!("Room sweeper stopped");
    }
}
