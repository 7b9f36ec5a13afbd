use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::message::Message;

/// Capability to acknowledge or negatively-acknowledge one delivered message.
///
/// Exactly one of `ack`/`nack` is expected per delivery; this is a protocol
/// expectation, not something the handle enforces.
pub trait AckHandle: Send + Sync {
    /// Acknowledge the message, removing it from redelivery.
    fn ack(&self);

    /// Negatively acknowledge the message, requesting immediate redelivery.
    fn nack(&self);
}

/// An [`AckHandle`] that accepts calls but has no observable effect.
/// Used by the broker simulator, where there is no redelivery machinery.
#[derive(Debug, Default)]
pub struct NoopAckHandle;

impl AckHandle for NoopAckHandle {
    fn ack(&self) {}

    fn nack(&self) {}
}

/// Capability to receive messages for a topic. Implemented by the consumer
/// pipeline and consumed by the broker simulator's dispatch worker.
pub trait MessageReceiver: Send + Sync {
    /// Delivers one message together with the handle to acknowledge it.
    fn receive(&self, message: Message, ack_handle: Arc<dyn AckHandle>);
}

/// Immutable snapshot of one inbound message plus the handle needed to
/// acknowledge it.
///
/// Created fresh per delivery and owned by that dispatch invocation. Cloning
/// is cheap and shares the underlying handle and ack-state flag, so an
/// acknowledgment made through a clone (for example inside an ack policy) is
/// visible to the delivery that created it.
#[derive(Clone)]
pub struct ConsumerContext {
    message: Message,
    ack_handle: Arc<dyn AckHandle>,
    acked: Arc<AtomicBool>,
    content_type: String,
    subscription: Option<String>,
}

impl ConsumerContext {
    /// Creates a context for one delivery.
    pub fn new(
        message: Message,
        ack_handle: Arc<dyn AckHandle>,
        content_type: impl Into<String>,
        subscription: Option<String>,
    ) -> Self {
        Self {
            message,
            ack_handle,
            acked: Arc::new(AtomicBool::new(false)),
            content_type: content_type.into(),
            subscription,
        }
    }

    /// The message being delivered.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// The content type resolved for this delivery (from the message
    /// attributes, or the configured default).
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The subscription this delivery originated from, when known.
    pub fn subscription(&self) -> Option<&str> {
        self.subscription.as_deref()
    }

    /// Acknowledges the message through the underlying handle.
    pub fn ack(&self) {
        self.acked.store(true, Ordering::SeqCst);
        self.ack_handle.ack();
    }

    /// Negatively acknowledges the message through the underlying handle.
    pub fn nack(&self) {
        self.acked.store(true, Ordering::SeqCst);
        self.ack_handle.nack();
    }

    /// Whether an acknowledgment decision (ack or nack) has been made on
    /// this context. Used to warn about manual-mode listeners that complete
    /// without deciding; it does not block further calls.
    pub fn is_acked(&self) -> bool {
        self.acked.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ConsumerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerContext")
            .field("message_id", &self.message.id())
            .field("content_type", &self.content_type)
            .field("subscription", &self.subscription)
            .field("acked", &self.is_acked())
            .finish()
    }
}
