//! Input collection

pub mod filesystem;

pub use filesystem::{collect_sources, CollectOptions};
