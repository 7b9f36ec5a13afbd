use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Attribute key carrying the payload content type, mirroring the header
/// convention of real brokers.
pub const CONTENT_TYPE_ATTRIBUTE: &str = "Content-Type";

/// A single message flowing through the delivery pipeline.
///
/// A message consists of an opaque byte payload, a map of string attributes,
/// an optional ordering key, a publish timestamp, and a broker-assigned
/// identifier. It is immutable once published: the pipeline only ever reads
/// from it.
///
/// # Example
///
/// ```rust
/// use msgflow::message::Message;
///
/// let msg = Message::new(br#"{"temp":25}"#.to_vec())
///     .with_content_type("application/json")
///     .with_ordering_key("sensor-1");
/// assert_eq!(msg.content_type(), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    id: String,
    payload: Vec<u8>,
    attributes: HashMap<String, String>,
    ordering_key: Option<String>,
    publish_time: DateTime<Utc>,
}

impl Message {
    /// Creates a new message with the given payload.
    /// The identifier is assigned here, the way a broker would on publish,
    /// and the publish timestamp is taken from the wall clock.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload: payload.into(),
            attributes: HashMap::new(),
            ordering_key: None,
            publish_time: Utc::now(),
        }
    }

    /// Adds a single attribute to the message.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the `Content-Type` attribute used for serde selection.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_attribute(CONTENT_TYPE_ATTRIBUTE, content_type)
    }

    /// Sets the ordering key. The simulator does not enforce per-key order
    /// (it delivers in global publish order); the key exists for API
    /// compatibility with real brokers.
    pub fn with_ordering_key(mut self, key: impl Into<String>) -> Self {
        self.ordering_key = Some(key.into());
        self
    }

    /// The broker-assigned message identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// All message attributes.
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// The content type declared on the message, if any.
    /// Exact attribute lookup only; no parameter or charset handling.
    pub fn content_type(&self) -> Option<&str> {
        self.attributes.get(CONTENT_TYPE_ATTRIBUTE).map(String::as_str)
    }

    /// The ordering key, if one was set at publish time.
    pub fn ordering_key(&self) -> Option<&str> {
        self.ordering_key.as_deref()
    }

    /// The publish timestamp.
    pub fn publish_time(&self) -> DateTime<Utc> {
        self.publish_time
    }
}
