//! Infrastructure adapters for config, tool lookup, permissions, and the clipboard.

pub mod clipboard;
pub mod config;
pub mod locator;
pub mod logging;
pub mod permissions;
