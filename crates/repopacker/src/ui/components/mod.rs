//! Widgets composed by the TUI.

pub mod form;
pub mod transcript;
