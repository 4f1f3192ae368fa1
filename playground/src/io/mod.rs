//! I/O helpers for the playground client.

pub mod client;
pub mod config;
pub mod render;
