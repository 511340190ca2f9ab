//! UseCase 層
//!
//! HTTP / WebSocket のハンドラから呼ばれるアプリケーションロジックです。
//! ルームの状態そのものはルームアクターが所有し、ここでは Registry と
//! RoomHandle を介して操作します。

pub mod create_room;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod join_room;
pub mod sweep_rooms;
pub mod transcode_message;

pub use create_room::CreateRoomUseCase;
pub use error::{GetRoomDetailError, JoinRoomError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use sweep_rooms::SweepExpiredRoomsUseCase;
pub use transcode_message::TranscodeMessageUseCase;
