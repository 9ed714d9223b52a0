//! Configuration for the front-end
//!
//! Limits live in [`compile_time`] and cannot be changed at runtime; user
//! preferences live in [`runtime`] and are read from the environment.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::RuntimeConfig;
