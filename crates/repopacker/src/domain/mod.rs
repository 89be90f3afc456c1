//! Domain types shared by the builder, runner, and front-ends.

pub mod errors;
pub mod model;
