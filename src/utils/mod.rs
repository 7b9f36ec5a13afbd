//! The `utils` module provides shared utilities used across `msgflow`:
//! the crate's error types and the tracing/logging initialization helper.

pub mod error;
pub mod logging;
