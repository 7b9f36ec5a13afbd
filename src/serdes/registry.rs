use std::collections::HashMap;
use std::sync::Arc;

use crate::serdes::{JsonSerDes, MessageSerDes};
use crate::utils::error::SerDesError;

/// Maps a content type to the serde that handles it.
///
/// The registry is populated at startup and read-only during dispatch, so it
/// can be shared behind an `Arc` without further locking. Keys are matched
/// exactly; no wildcard or parameter-aware matching is performed.
#[derive(Default)]
pub struct SerDesRegistry {
    entries: HashMap<String, Arc<dyn MessageSerDes>>,
}

impl SerDesRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in JSON serde registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonSerDes));
        registry
    }

    /// Registers a serde under its supported content type.
    /// The last registration for a given content type wins, which lets a
    /// consumer override the built-in handler for a format.
    pub fn register(&mut self, serdes: Arc<dyn MessageSerDes>) {
        self.entries
            .insert(serdes.supported_type().to_string(), serdes);
    }

    /// Looks up the serde for a content type, if one is registered.
    pub fn find(&self, content_type: &str) -> Option<Arc<dyn MessageSerDes>> {
        self.entries.get(content_type).cloned()
    }

    /// Resolves the serde for a content type, failing when none is registered.
    pub fn resolve(&self, content_type: &str) -> Result<Arc<dyn MessageSerDes>, SerDesError> {
        self.find(content_type)
            .ok_or_else(|| SerDesError::UnsupportedFormat(content_type.to_string()))
    }
}
