use serde_json::Value;

use crate::serdes::MessageSerDes;
use crate::utils::error::SerDesError;

/// The content type handled by [`JsonSerDes`].
pub const APPLICATION_JSON: &str = "application/json";

/// A [`MessageSerDes`] for `application/json` payloads, backed by
/// `serde_json`. Registered by default; consumers may override it by
/// registering their own serde for the same content type.
#[derive(Debug, Default)]
pub struct JsonSerDes;

impl MessageSerDes for JsonSerDes {
    fn supported_type(&self) -> &str {
        APPLICATION_JSON
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerDesError> {
        serde_json::to_vec(value).map_err(|e| SerDesError::Serialize {
            content_type: APPLICATION_JSON.to_string(),
            source: Box::new(e),
        })
    }

    fn deserialize(&self, data: &[u8]) -> Result<Value, SerDesError> {
        serde_json::from_slice(data).map_err(|e| SerDesError::Deserialize {
            target: "serde_json::Value",
            source: Box::new(e),
        })
    }
}
