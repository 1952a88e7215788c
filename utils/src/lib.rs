//! Shared utilities for verdict.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
