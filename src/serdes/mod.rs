//! Payload serialization and deserialization.
//!
//! A [`MessageSerDes`] converts between raw payload bytes and a
//! `serde_json::Value` interchange representation; serdes are selected by
//! the content type they support. The trait is object safe so the registry
//! can hold arbitrary formats behind `dyn`; the generic [`encode`] and
//! [`decode`] helpers recover call-site type safety on top of it.

pub mod json;
pub mod registry;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::utils::error::SerDesError;

pub use json::JsonSerDes;
pub use registry::SerDesRegistry;

/// Converts payload bytes to and from domain values for one content type.
///
/// Implementations are stateless and shared across concurrent deliveries.
pub trait MessageSerDes: Send + Sync {
    /// The content type this serde is capable of handling.
    fn supported_type(&self) -> &str;

    /// Serializes a value into payload bytes.
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerDesError>;

    /// Deserializes payload bytes into the interchange representation.
    fn deserialize(&self, data: &[u8]) -> Result<Value, SerDesError>;
}

/// Encodes a typed value into payload bytes using the given serde.
pub fn encode<T: Serialize>(serdes: &dyn MessageSerDes, value: &T) -> Result<Vec<u8>, SerDesError> {
    let interchange = serde_json::to_value(value).map_err(|e| SerDesError::Serialize {
        content_type: serdes.supported_type().to_string(),
        source: Box::new(e),
    })?;
    serdes.serialize(&interchange)
}

/// Decodes payload bytes into a typed value using the given serde.
pub fn decode<T: DeserializeOwned>(
    serdes: &dyn MessageSerDes,
    data: &[u8],
) -> Result<T, SerDesError> {
    let interchange = serdes.deserialize(data)?;
    serde_json::from_value(interchange).map_err(|e| SerDesError::Deserialize {
        target: std::any::type_name::<T>(),
        source: Box::new(e),
    })
}
