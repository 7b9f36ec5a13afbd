use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::consumer::ack::{AckPolicy, AckRouter, DeliveryError};
use crate::consumer::context::{AckHandle, ConsumerContext, MessageReceiver};
use crate::message::Message;
use crate::serdes::{SerDesRegistry, decode};
use crate::utils::error::{BoxError, SerDesError};

/// Whether the framework acknowledges a message after a successful handler
/// return, or the listener manages the handle itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    /// Acknowledge automatically after the handler returns successfully.
    Auto,
    /// The listener calls ack/nack on the context itself.
    Manual,
}

/// A registered message handler with a typed payload.
///
/// The payload type is declared as an associated type; secondary values
/// (publish time, ordering key, raw bytes, attributes) are reached through
/// the [`ConsumerContext`] passed alongside it, so each input has exactly
/// one source.
pub trait Listener: Send + Sync {
    /// The shape the payload is decoded into before invocation.
    type Payload: DeserializeOwned;

    /// Name used in logs and delivery errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Acknowledgment mode for this listener. Defaults to [`AckMode::Auto`].
    fn ack_mode(&self) -> AckMode {
        AckMode::Auto
    }

    /// The ack policy associated with this listener, if any. Listeners
    /// without one fall back to the router's default policy on failure.
    fn ack_policy(&self) -> Option<&dyn AckPolicy> {
        None
    }

    /// Handles one decoded message.
    fn on_message(&self, payload: Self::Payload, context: &ConsumerContext) -> Result<(), BoxError>;
}

/// Outcome of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler returned successfully. The dispatcher leaves the context
    /// unacked; acknowledgment on the success path belongs to the caller.
    Completed,
    /// Decoding or the handler failed; the failure was routed to an
    /// acknowledgment decision and does not propagate further.
    Failed,
}

/// Resolves the payload serde for a delivery, decodes the payload, invokes
/// the listener, and converts any failure into a [`DeliveryError`] routed
/// through the [`AckRouter`].
pub struct Dispatcher {
    registry: Arc<SerDesRegistry>,
    router: AckRouter,
    default_content_type: String,
}

impl Dispatcher {
    /// Creates a dispatcher over a populated serde registry.
    /// `default_content_type` applies to messages that carry no
    /// `Content-Type` attribute.
    pub fn new(registry: Arc<SerDesRegistry>, default_content_type: impl Into<String>) -> Self {
        Self {
            registry,
            router: AckRouter,
            default_content_type: default_content_type.into(),
        }
    }

    /// The content type a message resolves to: its declared attribute, or
    /// the configured default when absent.
    pub fn resolve_content_type(&self, message: &Message) -> String {
        message
            .content_type()
            .unwrap_or(&self.default_content_type)
            .to_string()
    }

    /// Dispatches one delivery to a listener.
    ///
    /// A missing serde for the context's content type is a setup problem and
    /// is returned as an error without touching the acknowledgment path.
    /// Decode failures and handler failures are treated uniformly: both are
    /// wrapped into a [`DeliveryError`] and handed to the ack router, and
    /// the call returns [`DispatchOutcome::Failed`].
    pub fn dispatch<L: Listener>(
        &self,
        listener: &L,
        context: &ConsumerContext,
    ) -> Result<DispatchOutcome, SerDesError> {
        let serdes = self.registry.resolve(context.content_type())?;

        let payload = match decode::<L::Payload>(serdes.as_ref(), context.message().payload()) {
            Ok(payload) => payload,
            Err(cause) => {
                self.route_failure(listener, context, Box::new(cause));
                return Ok(DispatchOutcome::Failed);
            }
        };

        match listener.on_message(payload, context) {
            Ok(()) => Ok(DispatchOutcome::Completed),
            Err(cause) => {
                self.route_failure(listener, context, cause);
                Ok(DispatchOutcome::Failed)
            }
        }
    }

    fn route_failure<L: Listener>(&self, listener: &L, context: &ConsumerContext, cause: BoxError) {
        let error = DeliveryError::new(listener.name(), context.clone(), cause);
        self.router.route(listener.ack_policy(), error);
    }
}

/// Adapts a [`Listener`] into a [`MessageReceiver`] so it can be registered
/// with a broker. Builds a fresh [`ConsumerContext`] per delivery, runs the
/// dispatcher, and applies the listener's [`AckMode`] on the success path.
pub struct ListenerReceiver<L: Listener> {
    dispatcher: Arc<Dispatcher>,
    listener: Arc<L>,
    subscription: String,
}

impl<L: Listener> ListenerReceiver<L> {
    /// Wraps a listener for the given subscription.
    pub fn new(dispatcher: Arc<Dispatcher>, listener: Arc<L>, subscription: impl Into<String>) -> Self {
        Self {
            dispatcher,
            listener,
            subscription: subscription.into(),
        }
    }
}

impl<L: Listener> MessageReceiver for ListenerReceiver<L> {
    fn receive(&self, message: Message, ack_handle: Arc<dyn AckHandle>) {
        let content_type = self.dispatcher.resolve_content_type(&message);
        let context = ConsumerContext::new(
            message,
            ack_handle,
            content_type,
            Some(self.subscription.clone()),
        );

        match self.dispatcher.dispatch(self.listener.as_ref(), &context) {
            Ok(DispatchOutcome::Completed) => match self.listener.ack_mode() {
                AckMode::Auto => context.ack(),
                AckMode::Manual => {
                    if !context.is_acked() {
                        warn!(
                            listener = self.listener.name(),
                            subscription = %self.subscription,
                            "listener completed without acknowledging, message will be redelivered"
                        );
                    }
                }
            },
            // Failures were already routed to an ack decision.
            Ok(DispatchOutcome::Failed) => {}
            Err(e) => {
                error!(
                    listener = self.listener.name(),
                    subscription = %self.subscription,
                    "failed to dispatch message: {}", e
                );
            }
        }
    }
}
