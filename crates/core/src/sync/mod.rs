//! Pull synchronization of remote collections into the local cache

pub mod classifier;
pub mod coordinator;
pub mod errors;
pub mod guard;
pub mod pagination;
pub mod ports;
pub mod progress;
pub mod validation;
