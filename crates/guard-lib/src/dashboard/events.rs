//! Push events from the legacy gateway channel
//!
//! The gateway broadcasts `telemetry`, `alert`, `ip:blocked` and
//! `attack_routed` events. Each arrives as an event name plus a JSON payload.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelemetryMetrics {
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: f64,
    #[serde(default)]
    pub network: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub metrics: TelemetryMetrics,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: String,
    pub source: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IpBlockedEvent {
    pub ip: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttackRoutedEvent {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub attack_type: Option<String>,
    #[serde(default)]
    pub nodes_targeted: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    Telemetry(TelemetryEvent),
    Alert(AlertEvent),
    IpBlocked(IpBlockedEvent),
    AttackRouted(AttackRoutedEvent),
}

impl GatewayEvent {
    /// Decode a named event. Unrelated event names yield `Ok(None)`.
    pub fn decode(name: &str, payload: serde_json::Value) -> serde_json::Result<Option<Self>> {
        let event = match name {
            "telemetry" => GatewayEvent::Telemetry(serde_json::from_value(payload)?),
            "alert" => GatewayEvent::Alert(serde_json::from_value(payload)?),
            "ip:blocked" => GatewayEvent::IpBlocked(serde_json::from_value(payload)?),
            "attack_routed" => GatewayEvent::AttackRouted(serde_json::from_value(payload)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}
