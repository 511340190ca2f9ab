//! UseCase: 管理用エンドポイントのメッセージ変換（obscure / reveal）

use std::sync::Arc;

use crate::domain::{CodecError, MessageCodec};

pub struct TranscodeMessageUseCase {
    codec: Arc<dyn MessageCodec>,
}

impl TranscodeMessageUseCase {
    pub fn new(codec: Arc<dyn MessageCodec>) -> Self {
        Self { codec }
    }

    pub fn encode(&self, plaintext: &str) -> Result<String, CodecError> {
        self.codec.obscure(plaintext)
    }

    pub fn decode(&self, token: &str) -> Result<String, CodecError> {
        self.codec.reveal(token)
    }
}
