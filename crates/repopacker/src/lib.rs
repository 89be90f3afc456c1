pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod ui;

/// Install the tracing subscriber. `RUST_LOG` overrides `default_directive`.
pub fn init(default_directive: &str) {
    infra::logging::init(default_directive);
}
