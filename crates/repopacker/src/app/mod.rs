//! Application layer: command construction and process execution.

pub mod command;
pub mod patterns;
pub mod runner;
