//! Server configuration.
//!
//! Defaults are the production values; tests shrink the intervals.

use std::time::Duration;

/// Lifetime, retention and queue sizes of rooms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// Fixed lifetime from creation, not extended by activity
    pub lifetime: Duration,
    /// Maximum age of a message kept in history
    pub history_retention: Duration,
    /// Period of the history retention sweep inside the room actor
    pub history_sweep_interval: Duration,
    /// Capacity of each session outbox; a full outbox evicts the session
    pub outbox_capacity: usize,
    /// Capacity of the room actor inbox
    pub inbox_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(30 * 60),
            history_retention: Duration::from_secs(24 * 60 * 60),
            history_sweep_interval: Duration::from_secs(5 * 60),
            outbox_capacity: 256,
            inbox_capacity: 256,
        }
    }
}

/// Timeouts and limits of the per-connection pumps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpConfig {
    /// Time allowed to write one frame
    pub write_wait: Duration,
    /// Time allowed between two inbound frames (pongs included)
    pub pong_wait: Duration,
    /// Keepalive ping period; must be shorter than `pong_wait`
    pub ping_period: Duration,
    /// Largest accepted inbound frame in bytes
    pub max_frame_bytes: usize,
}

impl PumpConfig {
    /// Config with the given read deadline and a ping period of 9/10 of it
    pub fn with_pong_wait(pong_wait: Duration) -> Self {
        Self {
            pong_wait,
            ping_period: pong_wait * 9 / 10,
            ..Self::default()
        }
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        let pong_wait = Duration::from_secs(60);
        Self {
            write_wait: Duration::from_secs(10),
            pong_wait,
            ping_period: pong_wait * 9 / 10,
            max_frame_bytes: 512,
        }
    }
}

/// Top-level configuration of the server binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub room: RoomConfig,
    pub pump: PumpConfig,
    /// Period of the registry sweep that retires expired rooms
    pub registry_sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            room: RoomConfig::default(),
            pump: PumpConfig::default(),
            registry_sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}
