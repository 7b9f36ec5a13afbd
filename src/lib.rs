//! # msgflow
//!
//! `msgflow` is the in-process message delivery core of a pub/sub consumer
//! framework: it takes a raw broker message, resolves its payload format,
//! decodes it, invokes the registered listener, and routes any failure to an
//! acknowledgment decision. It ships with an in-memory broker simulator so
//! the whole pipeline can be exercised without a live broker.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `message`: The immutable message type carried through the pipeline.
//! - `serdes`: Content-type keyed serializer/deserializer registry.
//! - `consumer`: Consumer context, dispatcher, and acknowledgment routing.
//! - `simulator`: An in-memory broker stand-in with a single dispatch worker.
//! - `config`: Handles loading and managing configuration.
//! - `utils`: Contains shared utilities, such as error types and logging setup.

pub mod config;
pub mod consumer;
pub mod message;
pub mod serdes;
pub mod simulator;
pub mod utils;

#[cfg(test)]
mod tests;
