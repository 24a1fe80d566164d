//! Process-wide tracing setup and request correlation ids.

pub mod tracing;

pub use tracing::{LogFormat, init_with, new_request_id};
