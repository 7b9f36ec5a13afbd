//! Message consumption: the consumer context, the dispatcher that decodes
//! payloads and invokes listeners, and the acknowledgment router that turns
//! delivery failures into ack/nack decisions.

pub mod ack;
pub mod context;
pub mod dispatcher;

pub use ack::{AckPolicy, AckRouter, DeliveryError};
pub use context::{AckHandle, ConsumerContext, MessageReceiver, NoopAckHandle};
pub use dispatcher::{AckMode, DispatchOutcome, Dispatcher, Listener, ListenerReceiver};
