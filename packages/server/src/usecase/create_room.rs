//! UseCase: ルーム作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//! - ルームアクターの起動と Registry への登録
//!
//! ### なぜこのテストが必要か
//! - 返されたリンクで即座に参加できることを保証
//! - 作成されたルームがプロセスのキャンセルスコープに従うことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム作成と参加
//! - 正常系：複数回の作成で異なる ID が返される
//! - エッジケース：ルートスコープのキャンセルで全ルームが停止する

use std::sync::Arc;

use hanare_shared::time::Clock;
use tokio_util::sync::CancellationToken;

use crate::{
    config::RoomConfig,
    domain::{MessageCodec, RoomIdFactory, RoomLink},
    room::{RegistryError, RoomActor, RoomRegistry},
};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    registry: Arc<RoomRegistry>,
    codec: Arc<dyn MessageCodec>,
    clock: Arc<dyn Clock>,
    config: RoomConfig,
    /// プロセス全体のキャンセルスコープ（ルームはこの子スコープで動く）
    root: CancellationToken,
}

impl CreateRoomUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        codec: Arc<dyn MessageCodec>,
        clock: Arc<dyn Clock>,
        config: RoomConfig,
        root: CancellationToken,
    ) -> Self {
        Self {
            registry,
            codec,
            clock,
            config,
            root,
        }
    }

    /// 新しいルームを作成し、共有用のリンクを返す
    ///
    /// ベース ID が衝突した場合は生成し直すため、常に成功する。
    pub async fn execute(&self) -> RoomLink {
        loop {
            let link = RoomIdFactory::generate();
            if self.registry.contains(link.room_id()).await {
                tracing::debug!("Room id '{}' already in use, regenerating", link.room_id());
                continue;
            }

            let room = RoomActor::spawn(
                link.clone(),
                self.config.clone(),
                self.codec.clone(),
                self.clock.clone(),
                &self.root,
            );

            // contains() と insert() の間に同じ ID が登録された場合
            match self.registry.insert(room.clone()).await {
                Ok(()) => {
                    tracing::info!(
                        room = %link.room_id(),
                        expires_at = room.expires_at().value(),
                        "Room created"
                    );
                    return link;
                }
                Err(RegistryError::DuplicateRoomId(id)) => {
                    room.close();
                    tracing::debug!("Room id '{}' registered concurrently, regenerating", id);
                }
            }
        }
    }
}
