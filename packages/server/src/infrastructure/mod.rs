//! Infrastructure layer: concrete codec and data transfer objects.

pub mod codec;
pub mod dto;
