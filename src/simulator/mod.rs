//! In-memory broker simulator.
//!
//! A deterministic, in-process substitute for a real message broker, used to
//! exercise the consumer pipeline in tests without a live broker. It is a
//! test double, not a broker: publishes on a full mailbox are dropped,
//! acknowledgments have no effect, and there is no persistence.

pub mod engine;

pub use engine::{BrokerSimulator, DEFAULT_TOPIC};

#[cfg(test)]
mod tests;
