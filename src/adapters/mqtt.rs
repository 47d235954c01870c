//! MQTT telemetry adapter.
//!
//! Implements [`TelemetryPort`] on top of the ESP-IDF MQTT client.  The
//! client runs its own network task; a receiver thread drains the event
//! connection and tracks the session state in an [`AtomicBool`] so
//! [`is_connected`](TelemetryPort::is_connected) never blocks.
//!
//! Nothing is subscribed.  Inbound messages (if a broker pushes any) go
//! to [`on_message`], which only logs them.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: a simulated broker whose reachability is set
//!   with [`sim_set_broker_reachable`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::app::ports::{LinkError, PublishError, TelemetryPort};
use crate::config::NetworkConfig;
#[cfg(target_os = "espidf")]
use crate::config::LINK_ATTEMPT_WAIT_MS;

#[cfg(target_os = "espidf")]
const CONNECT_POLL_MS: u64 = 50;

/// Inbound message hook.  The controller subscribes to nothing, so this
/// only records that something arrived.
pub fn on_message(topic: &str, data: &[u8]) {
    debug!("MQTT | ignoring inbound message on {} ({} bytes)", topic, data.len());
}

pub struct MqttTelemetry {
    url: String,
    client_id: String,
    connected: Arc<AtomicBool>,
    #[cfg(target_os = "espidf")]
    client: Option<esp_idf_svc::mqtt::client::EspMqttClient<'static>>,
}

impl MqttTelemetry {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            url: network.mqtt_url.clone(),
            client_id: network.mqtt_client_id.clone(),
            connected: Arc::new(AtomicBool::new(false)),
            #[cfg(target_os = "espidf")]
            client: None,
        }
    }
}

// ── ESP-IDF implementation ────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use embedded_svc::mqtt::client::{Details, EventPayload};
    use esp_idf_svc::mqtt::client::{EspMqttClient, EspMqttConnection, MqttClientConfiguration};
    use log::{info, warn};

    use crate::app::ports::LinkError;

    pub fn create_client(
        url: &str,
        client_id: &str,
        connected: Arc<AtomicBool>,
    ) -> Result<EspMqttClient<'static>, LinkError> {
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            ..Default::default()
        };
        let (client, conn) = EspMqttClient::new(url, &conf).map_err(|e| {
            warn!("MQTT | client init for {} failed: {:?}", url, e);
            LinkError::ClientInit
        })?;
        spawn_receiver(conn, connected)?;
        info!("MQTT | client created for {}", url);
        Ok(client)
    }

    fn spawn_receiver(
        mut conn: EspMqttConnection,
        connected: Arc<AtomicBool>,
    ) -> Result<(), LinkError> {
        thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(6 * 1024)
            .spawn(move || {
                loop {
                    match conn.next() {
                        Ok(event) => match event.payload() {
                            EventPayload::Connected(_) => {
                                connected.store(true, Ordering::Relaxed);
                            }
                            EventPayload::Disconnected => {
                                connected.store(false, Ordering::Relaxed);
                            }
                            EventPayload::Received {
                                topic: Some(topic),
                                data,
                                details: Details::Complete,
                                ..
                            } => super::on_message(topic, data),
                            _ => {}
                        },
                        Err(e) => {
                            connected.store(false, Ordering::Relaxed);
                            warn!("MQTT | event connection closed: {:?}", e);
                            break;
                        }
                    }
                }
            })
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT | receiver thread spawn failed: {}", e);
                LinkError::ClientInit
            })
    }
}

#[cfg(target_os = "espidf")]
impl TelemetryPort for MqttTelemetry {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn try_connect(&mut self) -> Result<(), LinkError> {
        if self.client.is_none() {
            let client = esp::create_client(&self.url, &self.client_id, self.connected.clone())?;
            self.client = Some(client);
        }

        // The client reconnects on its own; an attempt is a bounded wait
        // for the session flag.
        let mut waited = 0;
        while !self.is_connected() && waited < u64::from(LINK_ATTEMPT_WAIT_MS) {
            std::thread::sleep(std::time::Duration::from_millis(CONNECT_POLL_MS));
            waited += CONNECT_POLL_MS;
        }
        if self.is_connected() {
            info!("MQTT | connected to {}", self.url);
            Ok(())
        } else {
            Err(LinkError::Unreachable)
        }
    }

    fn publish(&mut self, topic: &str, payload: &str, retain: bool) -> Result<(), PublishError> {
        use embedded_svc::mqtt::client::QoS;

        if !self.is_connected() {
            return Err(PublishError::NotConnected);
        }
        let client = self.client.as_mut().ok_or(PublishError::NotConnected)?;
        client
            .publish(topic, QoS::AtLeastOnce, retain, payload.as_bytes())
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT | publish {} failed: {:?}", topic, e);
                PublishError::Rejected
            })
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static BROKER_REACHABLE: AtomicBool = AtomicBool::new(true);

/// Make the simulated broker accept or refuse sessions (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_broker_reachable(reachable: bool) {
    BROKER_REACHABLE.store(reachable, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
impl TelemetryPort for MqttTelemetry {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed) && BROKER_REACHABLE.load(Ordering::Relaxed)
    }

    fn try_connect(&mut self) -> Result<(), LinkError> {
        if !BROKER_REACHABLE.load(Ordering::Relaxed) {
            self.connected.store(false, Ordering::Relaxed);
            return Err(LinkError::Unreachable);
        }
        self.connected.store(true, Ordering::Relaxed);
        info!("MQTT(sim): connected to {} as {}", self.url, self.client_id);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str, retain: bool) -> Result<(), PublishError> {
        if !self.is_connected() {
            warn!("MQTT(sim): publish to {} while disconnected", topic);
            return Err(PublishError::NotConnected);
        }
        info!("MQTT(sim): {} = {} (retain={})", topic, payload, retain);
        Ok(())
    }
}
