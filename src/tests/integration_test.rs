//! End-to-end coverage of the delivery pipeline: simulator → dispatcher →
//! listener → acknowledgment routing, with no live broker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::consumer::{
    AckPolicy, ConsumerContext, DeliveryError, Dispatcher, Listener, ListenerReceiver,
};
use crate::message::Message;
use crate::serdes::SerDesRegistry;
use crate::simulator::BrokerSimulator;
use crate::utils::error::BoxError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Order {
    id: u64,
    item: String,
}

struct OrderListener {
    received: Mutex<Vec<Order>>,
}

impl Listener for OrderListener {
    type Payload = Order;

    fn name(&self) -> &str {
        "order-listener"
    }

    fn on_message(&self, payload: Order, _context: &ConsumerContext) -> Result<(), BoxError> {
        self.received.lock().unwrap().push(payload);
        Ok(())
    }
}

fn wait_until(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        if Instant::now() > deadline {
            panic!("condition not met within deadline");
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn pipeline() -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(
        Arc::new(SerDesRegistry::with_defaults()),
        "application/json",
    ))
}

#[test]
fn integration_publish_to_typed_listener() {
    let simulator = BrokerSimulator::new();
    let listener = Arc::new(OrderListener {
        received: Mutex::new(Vec::new()),
    });
    let receiver = ListenerReceiver::new(pipeline(), listener.clone(), "orders-sub");
    simulator.register_receiver(Arc::new(receiver), "orders");

    simulator.publish(
        Message::new(br#"{"id":1,"item":"keyboard"}"#.to_vec())
            .with_content_type("application/json"),
        "orders",
    );
    simulator.publish(
        Message::new(br#"{"id":2,"item":"mouse"}"#.to_vec())
            .with_content_type("application/json"),
        "orders",
    );

    wait_until(|| listener.received.lock().unwrap().len() == 2);
    let received = listener.received.lock().unwrap();
    assert_eq!(received[0].id, 1);
    assert_eq!(received[1].id, 2);
}

struct CountingPolicy {
    invocations: AtomicUsize,
}

impl AckPolicy for CountingPolicy {
    fn handle(&self, error: &DeliveryError) {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        error.context().nack();
    }
}

struct RejectingListener {
    policy: Arc<CountingPolicy>,
}

impl Listener for RejectingListener {
    type Payload = Order;

    fn name(&self) -> &str {
        "rejecting-listener"
    }

    fn ack_policy(&self) -> Option<&dyn AckPolicy> {
        Some(self.policy.as_ref())
    }

    fn on_message(&self, _payload: Order, _context: &ConsumerContext) -> Result<(), BoxError> {
        Err("order rejected".into())
    }
}

#[test]
fn integration_failure_reaches_custom_ack_policy() {
    let simulator = BrokerSimulator::new();
    let policy = Arc::new(CountingPolicy {
        invocations: AtomicUsize::new(0),
    });
    let listener = Arc::new(RejectingListener {
        policy: policy.clone(),
    });
    let receiver = ListenerReceiver::new(pipeline(), listener, "orders-sub");
    simulator.register_receiver(Arc::new(receiver), "orders");

    simulator.publish(
        Message::new(br#"{"id":3,"item":"monitor"}"#.to_vec())
            .with_content_type("application/json"),
        "orders",
    );

    wait_until(|| policy.invocations.load(Ordering::SeqCst) == 1);
}

#[test]
fn integration_malformed_payload_reaches_policy_and_worker_survives() {
    let simulator = BrokerSimulator::new();
    let policy = Arc::new(CountingPolicy {
        invocations: AtomicUsize::new(0),
    });
    let listener = Arc::new(RejectingListener {
        policy: policy.clone(),
    });
    let receiver = ListenerReceiver::new(pipeline(), listener, "orders-sub");
    simulator.register_receiver(Arc::new(receiver), "orders");

    simulator.publish(
        Message::new(b"definitely not json".to_vec()).with_content_type("application/json"),
        "orders",
    );
    simulator.publish(
        Message::new(br#"{"id":4,"item":"cable"}"#.to_vec()).with_content_type("application/json"),
        "orders",
    );

    // Both the decode failure and the handler rejection route to the policy.
    wait_until(|| policy.invocations.load(Ordering::SeqCst) == 2);
}
