//! XOR で難読化する MessageCodec 実装
//!
//! token の形式: `base64(key || plaintext XOR key)`
//!
//! 鍵は平文と同じ長さで、OS の乱数生成器から毎回新しく生成します。
//! そのため同じ平文でも token は毎回異なります。

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{RngCore, rngs::OsRng};

use crate::domain::{CodecError, MessageCodec};

/// XOR + base64 の Codec
#[derive(Debug, Clone, Copy, Default)]
pub struct XorCodec;

impl XorCodec {
    pub fn new() -> Self {
        Self
    }
}

impl MessageCodec for XorCodec {
    fn obscure(&self, plaintext: &str) -> Result<String, CodecError> {
        let plain = plaintext.as_bytes();
        let mut buffer = vec![0u8; plain.len() * 2];
        let (key, cipher) = buffer.split_at_mut(plain.len());

        OsRng
            .try_fill_bytes(key)
            .map_err(|e| CodecError::KeyGeneration(e.to_string()))?;
        xor_into(cipher, plain, key);

        Ok(STANDARD.encode(&buffer))
    }

    fn reveal(&self, token: &str) -> Result<String, CodecError> {
        let decoded = STANDARD
            .decode(token)
            .map_err(|e| CodecError::MalformedToken(e.to_string()))?;

        if decoded.len() % 2 != 0 {
            return Err(CodecError::MalformedToken(format!(
                "odd decoded length {}",
                decoded.len()
            )));
        }

        let (key, cipher) = decoded.split_at(decoded.len() / 2);
        let mut plain = vec![0u8; cipher.len()];
        xor_into(&mut plain, cipher, key);

        String::from_utf8(plain).map_err(|_| CodecError::InvalidUtf8)
    }
}

fn xor_into(out: &mut [u8], data: &[u8], key: &[u8]) {
    for ((o, d), k) in out.iter_mut().zip(data).zip(key) {
        *o = d ^ k;
    }
}
