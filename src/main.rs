use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use msgflow::config::load_config;
use msgflow::consumer::{ConsumerContext, Dispatcher, Listener, ListenerReceiver};
use msgflow::message::Message;
use msgflow::serdes::SerDesRegistry;
use msgflow::simulator::BrokerSimulator;
use msgflow::utils::error::BoxError;
use msgflow::utils::logging;

#[derive(Debug, Deserialize)]
struct SensorReading {
    sensor: String,
    temp: f64,
}

struct LoggingListener;

impl Listener for LoggingListener {
    type Payload = SensorReading;

    fn name(&self) -> &str {
        "logging-listener"
    }

    fn on_message(&self, payload: SensorReading, context: &ConsumerContext) -> Result<(), BoxError> {
        info!(
            message_id = context.message().id(),
            sensor = %payload.sensor,
            temp = payload.temp,
            "received reading"
        );
        Ok(())
    }
}

fn main() {
    logging::init("info");
    let settings = load_config().expect("Failed to load configuration");

    let registry = Arc::new(SerDesRegistry::with_defaults());
    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        settings.consumer.default_content_type.clone(),
    ));

    let mut simulator = BrokerSimulator::with_capacity(settings.simulator.mailbox_capacity);
    let receiver = ListenerReceiver::new(dispatcher, Arc::new(LoggingListener), "sensor-readings");
    simulator.register_receiver(Arc::new(receiver), "readings");

    for i in 0..3 {
        let message = Message::new(format!(r#"{{"sensor":"s-{i}","temp":{}.5}}"#, 20 + i))
            .with_content_type("application/json")
            .with_ordering_key(format!("s-{i}"));
        simulator.publish(message, "readings");
    }

    // Give the dispatch worker time to drain the mailbox before stopping.
    std::thread::sleep(Duration::from_millis(500));
    simulator.close();
}
