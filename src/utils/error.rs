//! The `error` module defines the error types used within `msgflow`.
//!
//! Configuration-time problems (an unresolvable content type) and payload
//! encode/decode failures are both represented here; the dispatcher decides
//! which of them surface to the caller and which are routed to an
//! acknowledgment decision.

use thiserror::Error;

/// Boxed error type carried as the cause of serde and delivery failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while resolving or applying a payload serde.
#[derive(Debug, Error)]
pub enum SerDesError {
    /// No serde is registered for the requested content type. This is a
    /// setup problem and is surfaced synchronously to the dispatch caller
    /// rather than being routed to an acknowledgment decision.
    #[error("no serde registered for content type [{0}]")]
    UnsupportedFormat(String),

    /// The payload bytes could not be decoded into the requested type.
    #[error("error decoding payload into [{target}]: {source}")]
    Deserialize {
        /// Name of the type the payload was being decoded into.
        target: &'static str,
        /// Underlying decode failure.
        source: BoxError,
    },

    /// The value could not be encoded for the serde's content type.
    #[error("error encoding value for content type [{content_type}]: {source}")]
    Serialize {
        /// Content type of the serde that failed to encode.
        content_type: String,
        /// Underlying encode failure.
        source: BoxError,
    },
}
