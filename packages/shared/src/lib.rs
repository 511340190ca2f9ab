//! Utilities shared by the Hanare server binary and its tests.

pub mod logger;
pub mod time;
