use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::engine::BrokerSimulator;
use crate::consumer::context::{AckHandle, MessageReceiver};
use crate::message::Message;

/// Collects delivered messages for assertions.
#[derive(Default)]
struct CollectingReceiver {
    messages: Mutex<Vec<Message>>,
}

impl CollectingReceiver {
    fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    fn payloads(&self) -> Vec<Vec<u8>> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.payload().to_vec())
            .collect()
    }
}

impl MessageReceiver for CollectingReceiver {
    fn receive(&self, message: Message, _ack_handle: Arc<dyn AckHandle>) {
        self.messages.lock().unwrap().push(message);
    }
}

/// Polls until `condition` holds, panicking after two seconds.
fn wait_until(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        if Instant::now() > deadline {
            panic!("condition not met within deadline");
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_delivery_isolation_between_topics() {
    let simulator = BrokerSimulator::new();
    let receiver_a = Arc::new(CollectingReceiver::default());
    let receiver_b = Arc::new(CollectingReceiver::default());
    simulator.register_receiver(receiver_a.clone(), "topic_a");
    simulator.register_receiver(receiver_b.clone(), "topic_b");

    simulator.publish(Message::new(b"for a".to_vec()), "topic_a");

    wait_until(|| receiver_a.count() == 1);
    assert_eq!(receiver_a.payloads(), vec![b"for a".to_vec()]);
    assert_eq!(receiver_b.count(), 0);
}

#[test]
fn test_unregistered_topic_drops_message() {
    let simulator = BrokerSimulator::new();
    let receiver = Arc::new(CollectingReceiver::default());
    simulator.register_receiver(receiver.clone(), "registered");

    simulator.publish(Message::new(b"nowhere".to_vec()), "unregistered");
    std::thread::sleep(Duration::from_millis(300));

    assert_eq!(receiver.count(), 0);
}

#[test]
fn test_messages_delivered_in_publish_order() {
    let simulator = BrokerSimulator::new();
    let receiver = Arc::new(CollectingReceiver::default());
    simulator.register_receiver(receiver.clone(), "ordered");

    simulator.publish(Message::new(b"m1".to_vec()), "ordered");
    simulator.publish(Message::new(b"m2".to_vec()), "ordered");
    simulator.publish(Message::new(b"m3".to_vec()), "ordered");

    wait_until(|| receiver.count() == 3);
    assert_eq!(
        receiver.payloads(),
        vec![b"m1".to_vec(), b"m2".to_vec(), b"m3".to_vec()]
    );
}

#[test]
fn test_last_registration_wins() {
    let simulator = BrokerSimulator::new();
    let first = Arc::new(CollectingReceiver::default());
    let second = Arc::new(CollectingReceiver::default());
    simulator.register_receiver(first.clone(), "contested");
    simulator.register_receiver(second.clone(), "contested");

    simulator.publish(Message::new(b"who gets it".to_vec()), "contested");

    wait_until(|| second.count() == 1);
    assert_eq!(first.count(), 0);
}

#[test]
fn test_default_topic_conveniences() {
    let simulator = BrokerSimulator::new();
    let receiver = Arc::new(CollectingReceiver::default());
    simulator.register_default_receiver(receiver.clone());

    simulator.publish_default(Message::new(b"hello".to_vec()));

    wait_until(|| receiver.count() == 1);
}

#[test]
fn test_no_deliveries_after_close() {
    let mut simulator = BrokerSimulator::new();
    let receiver = Arc::new(CollectingReceiver::default());
    simulator.register_receiver(receiver.clone(), "topic");

    simulator.publish(Message::new(b"before".to_vec()), "topic");
    wait_until(|| receiver.count() == 1);

    simulator.close();
    assert!(!simulator.is_running());

    simulator.publish(Message::new(b"after".to_vec()), "topic");
    std::thread::sleep(Duration::from_millis(300));

    assert_eq!(receiver.count(), 1);
}

#[test]
fn test_publish_on_full_mailbox_is_dropped_without_error() {
    // Tiny mailbox with no receiver draining it.
    let simulator = BrokerSimulator::with_capacity(1);

    simulator.publish(Message::new(b"fits".to_vec()), "unregistered");
    // Give the worker a moment to drain the first message, then saturate.
    std::thread::sleep(Duration::from_millis(200));
    simulator.publish(Message::new(b"fits too".to_vec()), "unregistered");
    simulator.publish(Message::new(b"dropped".to_vec()), "unregistered");
    // No panic and no error surface; nothing further to assert.
}

/// Receiver that panics on its first delivery and collects afterwards.
struct FlakyReceiver {
    failures_left: AtomicUsize,
    delivered: AtomicUsize,
}

impl MessageReceiver for FlakyReceiver {
    fn receive(&self, _message: Message, _ack_handle: Arc<dyn AckHandle>) {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            panic!("receiver failure");
        }
        self.delivered.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_panicking_receiver_does_not_kill_worker() {
    let simulator = BrokerSimulator::new();
    let receiver = Arc::new(FlakyReceiver {
        failures_left: AtomicUsize::new(1),
        delivered: AtomicUsize::new(0),
    });
    simulator.register_receiver(receiver.clone(), "flaky");

    simulator.publish(Message::new(b"boom".to_vec()), "flaky");
    simulator.publish(Message::new(b"fine".to_vec()), "flaky");

    wait_until(|| receiver.delivered.load(Ordering::SeqCst) == 1);
}
