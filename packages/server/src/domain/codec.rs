//! Codec trait 定義
//!
//! メッセージ本文の可逆な難読化のインターフェースです。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 鍵は token の中に同梱されるため、これは秘匿のための仕組みではありません。

use super::CodecError;

/// メッセージ本文の obscure / reveal を行う Codec
#[cfg_attr(test, mockall::automock)]
pub trait MessageCodec: Send + Sync {
    /// 平文を token に変換する（同じ平文でも毎回異なる token になる）
    fn obscure(&self, plaintext: &str) -> Result<String, CodecError>;

    /// token を平文に戻す
    fn reveal(&self, token: &str) -> Result<String, CodecError>;
}
