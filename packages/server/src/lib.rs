//! Ephemeral room chat server library.
//!
//! Clients create short-lived rooms over HTTP and chat inside them over
//! WebSocket. Each room is an actor task that owns its members and history;
//! each connection is a pair of read/write pumps talking to that actor.

pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod room;
pub mod ui;
pub mod usecase;
