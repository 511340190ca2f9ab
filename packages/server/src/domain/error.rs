//! Domain error types.

use thiserror::Error;

/// 値オブジェクトの生成に失敗した場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Room ID が `xxx-xxxx-xxx` 形式ではない
    #[error("invalid room id: '{0}'")]
    InvalidRoomId(String),

    /// Room link が `xxx-xxxx-xxx?hs=NNN` 形式ではない
    #[error("invalid room link: '{0}'")]
    InvalidRoomLink(String),

    /// Color が `#rrggbb` 形式ではない
    #[error("invalid color: '{0}'")]
    InvalidColor(String),

    /// Nickname が空
    #[error("nickname must not be empty")]
    EmptyNickname,
}

/// Codec (obscure / reveal) のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Token が base64 として不正、または長さが不正
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// 復号結果が UTF-8 ではない
    #[error("revealed payload is not valid UTF-8")]
    InvalidUtf8,

    /// 鍵の生成に失敗
    #[error("failed to generate key material: {0}")]
    KeyGeneration(String),
}
