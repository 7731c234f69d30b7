//! Infrastructure adapters for configuration, waits, and external boundaries.

#[cfg(unix)]
pub mod bridge;
pub mod config;
pub mod pasteboard;
pub mod remote;
pub mod wait;
