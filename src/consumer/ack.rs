use std::panic::{AssertUnwindSafe, catch_unwind};

use thiserror::Error;
use tracing::error;

use crate::consumer::context::ConsumerContext;
use crate::utils::error::BoxError;

/// The wrapped failure produced when payload decoding or listener invocation
/// fails during dispatch. Carries the listener's name, the consumer context
/// of the failed delivery, and the triggering cause.
#[derive(Debug, Error)]
#[error("error processing message on listener [{listener}]: {cause}")]
pub struct DeliveryError {
    listener: String,
    context: ConsumerContext,
    #[source]
    cause: BoxError,
}

impl DeliveryError {
    /// Creates a delivery error. Only the dispatcher is expected to do this.
    pub fn new(listener: impl Into<String>, context: ConsumerContext, cause: BoxError) -> Self {
        Self {
            listener: listener.into(),
            context,
            cause,
        }
    }

    /// Name of the listener whose delivery failed.
    pub fn listener(&self) -> &str {
        &self.listener
    }

    /// The consumer context of the failed delivery. An [`AckPolicy`] uses
    /// this to make its ack/nack decision.
    pub fn context(&self) -> &ConsumerContext {
        &self.context
    }

    /// The triggering failure.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync) {
        self.cause.as_ref()
    }
}

/// Capability implemented by listeners wanting custom redelivery control.
///
/// `handle` is fully responsible for the acknowledgment decision: it is
/// expected to call exactly one of `ack`/`nack` on the error's context, or
/// deliberately leave the message unacked for redelivery.
pub trait AckPolicy: Send + Sync {
    /// Decides the acknowledgment outcome for a failed delivery.
    fn handle(&self, error: &DeliveryError);
}

/// Routes delivery failures to the listener's [`AckPolicy`], falling back to
/// the default policy when none is registered.
///
/// The router itself never propagates a failure: a panicking policy is
/// caught and logged so the dispatch worker survives.
#[derive(Debug, Default)]
pub struct AckRouter;

impl AckRouter {
    /// Routes one delivery failure.
    ///
    /// With no policy registered, the failure is logged and the message left
    /// unacked, so the upstream broker's redelivery mechanism retries it
    /// rather than losing it silently.
    pub fn route(&self, policy: Option<&dyn AckPolicy>, error: DeliveryError) {
        match policy {
            Some(policy) => {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(|| policy.handle(&error))) {
                    error!(
                        listener = error.listener(),
                        "ack policy panicked, leaving message unacked: {:?}", panic
                    );
                }
            }
            None => {
                error!(
                    listener = error.listener(),
                    subscription = error.context().subscription().unwrap_or(""),
                    message_id = error.context().message().id(),
                    "{}; message left unacked for redelivery",
                    error
                );
            }
        }
    }
}
