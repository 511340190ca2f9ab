//! `MessageCodec` の実装
//!
//! - `xor`: ランダム鍵による XOR + base64 の実装

pub mod xor;

pub use xor::XorCodec;
