use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, sync_channel};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, error};

use crate::consumer::context::{AckHandle, MessageReceiver, NoopAckHandle};
use crate::message::Message;

/// Topic used by the convenience publish/register methods.
pub const DEFAULT_TOPIC: &str = "default";

/// Default capacity of the bounded mailbox.
const DEFAULT_MAILBOX_CAPACITY: usize = 100;

/// How long the worker blocks on the mailbox before re-checking the running
/// flag, so a stop request is observed promptly.
const MAILBOX_POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Delivery {
    message: Message,
    topic: String,
}

type ReceiverTable = Arc<RwLock<HashMap<String, Arc<dyn MessageReceiver>>>>;

/// An in-memory stand-in for a real message broker.
///
/// Publishes go into a bounded mailbox and are drained by a single dedicated
/// worker thread, started at construction, which delivers each message
/// synchronously to the receiver registered for its topic. Because one
/// worker drains one FIFO mailbox, deliveries happen in strict publish order
/// across all topics.
///
/// Messages for topics with no registered receiver are discarded, and a
/// publish against a full mailbox is silently dropped. Both are acceptable
/// for a test double only.
pub struct BrokerSimulator {
    mailbox: SyncSender<Delivery>,
    receivers: ReceiverTable,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl BrokerSimulator {
    /// Creates a simulator with the default mailbox capacity and starts its
    /// dispatch worker.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Creates a simulator with the given mailbox capacity and starts its
    /// dispatch worker.
    pub fn with_capacity(capacity: usize) -> Self {
        let (mailbox, inbox) = sync_channel(capacity);
        let receivers: ReceiverTable = Arc::new(RwLock::new(HashMap::new()));
        let running = Arc::new(AtomicBool::new(true));

        let worker = std::thread::spawn({
            let receivers = receivers.clone();
            let running = running.clone();
            move || dispatch_loop(&inbox, &receivers, &running)
        });

        Self {
            mailbox,
            receivers,
            running,
            worker: Some(worker),
        }
    }

    /// Enqueues a message for delivery to the receiver registered for
    /// `topic`. Non-blocking: when the mailbox is full the message is
    /// dropped without error.
    pub fn publish(&self, message: Message, topic: &str) {
        let delivery = Delivery {
            message,
            topic: topic.to_string(),
        };
        if self.mailbox.try_send(delivery).is_err() {
            debug!(topic, "mailbox full, dropping message");
        }
    }

    /// Publishes to the default topic.
    pub fn publish_default(&self, message: Message) {
        self.publish(message, DEFAULT_TOPIC);
    }

    /// Installs or replaces the receiver for a topic. Each topic has at most
    /// one receiver; the last registration wins.
    pub fn register_receiver(&self, receiver: Arc<dyn MessageReceiver>, topic: &str) {
        self.receivers
            .write()
            .unwrap()
            .insert(topic.to_string(), receiver);
    }

    /// Registers a receiver for the default topic.
    pub fn register_default_receiver(&self, receiver: Arc<dyn MessageReceiver>) {
        self.register_receiver(receiver, DEFAULT_TOPIC);
    }

    /// Requests a cooperative stop: the worker finishes its current blocking
    /// wait and exits. Enqueued-but-undelivered messages are not drained,
    /// and the worker is not joined.
    pub fn close(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether a stop has not yet been requested.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for BrokerSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BrokerSimulator {
    fn drop(&mut self) {
        self.close();
        // The worker terminates on its own once it observes the flag or the
        // mailbox disconnects; it is deliberately not joined here.
        self.worker.take();
    }
}

fn dispatch_loop(inbox: &Receiver<Delivery>, receivers: &ReceiverTable, running: &AtomicBool) {
    while running.load(Ordering::SeqCst) {
        let delivery = match inbox.recv_timeout(MAILBOX_POLL_INTERVAL) {
            Ok(delivery) => delivery,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        // A stop requested while the wait was in flight wins over whatever
        // the wait produced; nothing is delivered after close.
        if !running.load(Ordering::SeqCst) {
            break;
        }

        // Receiver registered for the topic at delivery time, if any.
        let receiver = receivers.read().unwrap().get(&delivery.topic).cloned();
        match receiver {
            Some(receiver) => {
                let topic = delivery.topic;
                let message = delivery.message;
                let ack_handle: Arc<dyn AckHandle> = Arc::new(NoopAckHandle);
                // One panicking receiver must not take down the shared worker.
                if catch_unwind(AssertUnwindSafe(|| receiver.receive(message, ack_handle))).is_err()
                {
                    error!(topic = %topic, "receiver panicked, delivery abandoned");
                }
            }
            None => {
                debug!(topic = %delivery.topic, "no receiver registered, dropping message");
            }
        }
    }
}
