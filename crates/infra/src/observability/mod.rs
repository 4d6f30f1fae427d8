//! Logging setup
//!
//! The engine logs through `tracing` macros; this module installs the
//! subscriber that renders them.

pub mod logging;

pub use logging::{build_filter, init_tracing};
