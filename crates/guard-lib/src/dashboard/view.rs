//! Derived dashboard state

use super::events::GatewayEvent;
use super::normalize::{derive_alerts, normalize_all, sample_from_volume};
use crate::buffer::BoundedBuffer;
use crate::models::{
    Alert, AlertSeverity, DashboardSnapshot, LogCategory, Node, SecurityLog, TelemetrySample,
};
use serde::Serialize;

/// Maximum normalized log entries kept
pub const LOG_CAPACITY: usize = 50;

/// Telemetry chart window
pub const TELEMETRY_CAPACITY: usize = 30;

/// Headline counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_events: u64,
    pub blocked_alerts: usize,
}

/// Everything the dashboard renders, rebuilt on each successful poll
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub logs: BoundedBuffer<SecurityLog>,
    pub alerts: Vec<Alert>,
    pub summary: DashboardSummary,
    pub telemetry: BoundedBuffer<TelemetrySample>,
    pub nodes: Vec<Node>,
    pub selected_node: Option<String>,
    pub unreachable: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<String>,
    #[serde(skip)]
    engine_address: String,
}

impl DashboardView {
    /// `engine_address` is shown on the synthetic detection-engine node
    pub fn new(engine_address: impl Into<String>) -> Self {
        Self {
            logs: BoundedBuffer::new(LOG_CAPACITY),
            alerts: Vec::new(),
            summary: DashboardSummary::default(),
            telemetry: BoundedBuffer::new(TELEMETRY_CAPACITY),
            nodes: Vec::new(),
            selected_node: None,
            unreachable: false,
            last_error: None,
            last_updated: None,
            engine_address: engine_address.into(),
        }
    }

    /// Rebuild the view from a freshly fetched snapshot
    pub fn apply_snapshot(&mut self, snapshot: &DashboardSnapshot) {
        let logs = normalize_all(&snapshot.logs, LOG_CAPACITY);

        self.summary.total_events = snapshot.total_logs.unwrap_or(logs.len() as u64);
        self.telemetry.push(sample_from_volume(logs.len()));
        self.logs.replace(logs);
        self.refresh_alerts();

        let engine = Node::detection_engine(self.engine_address.clone());
        self.selected_node = Some(engine.id.clone());
        self.nodes = vec![engine];

        self.unreachable = false;
        self.last_error = None;
        self.last_updated = Some(chrono::Utc::now().to_rfc3339());
    }

    /// Flag the backend as unreachable without touching anything else
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.unreachable = true;
        self.last_error = Some(error.into());
    }

    /// Fold a pushed gateway event into the view
    pub fn apply_event(&mut self, event: GatewayEvent) {
        let now = chrono::Utc::now().to_rfc3339();
        match event {
            GatewayEvent::Telemetry(t) => {
                self.telemetry.push(TelemetrySample {
                    time: chrono::Local::now().format("%H:%M:%S").to_string(),
                    cpu: t.metrics.cpu.min(99.0),
                    memory: t.metrics.memory.min(100.0),
                    net: t.metrics.network,
                });
            }
            GatewayEvent::Alert(a) => {
                let critical = matches!(a.severity.as_str(), "critical" | "high");
                let (status, category) = if critical {
                    ("blocked", LogCategory::Error)
                } else {
                    ("warning", LogCategory::Warning)
                };
                let message = if a.description.is_empty() {
                    a.title
                } else {
                    format!("{} | {}", a.title, a.description)
                };
                self.push_event_log(
                    &a.source,
                    status,
                    Some(a.severity),
                    message,
                    category,
                    a.timestamp,
                );
            }
            GatewayEvent::IpBlocked(e) => {
                let reason = e.reason.unwrap_or_else(|| "policy".to_string());
                self.push_event_log(
                    "Firewall",
                    "blocked",
                    e.severity,
                    format!("IP {} blocked ({})", e.ip, reason),
                    LogCategory::Error,
                    now,
                );
            }
            GatewayEvent::AttackRouted(e) => {
                let attack = e.attack_type.unwrap_or_else(|| "attack".to_string());
                let sector = e.sector.unwrap_or_else(|| "unknown".to_string());
                self.push_event_log(
                    "API Gateway",
                    "routed",
                    None,
                    format!(
                        "{} routed to sector {} ({} nodes targeted)",
                        attack, sector, e.nodes_targeted
                    ),
                    LogCategory::Info,
                    now,
                );
            }
        }
    }

    fn push_event_log(
        &mut self,
        service: &str,
        status: &str,
        threat_level: Option<String>,
        message: String,
        category: LogCategory,
        timestamp: String,
    ) {
        let id = format!("event-{}", self.summary.total_events);
        self.summary.total_events += 1;
        self.logs.push(SecurityLog {
            id,
            timestamp,
            service: service.to_string(),
            status: status.to_string(),
            threat_level,
            score: None,
            source: None,
            message,
            category,
        });
        self.refresh_alerts();
    }

    /// Alerts always mirror the retained logs
    fn refresh_alerts(&mut self) {
        self.alerts = derive_alerts(self.logs.iter());
        self.summary.blocked_alerts = self
            .alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::events::{AlertEvent, IpBlockedEvent, TelemetryEvent, TelemetryMetrics};
    use crate::models::RawLogRecord;

    fn snapshot(json: &str) -> DashboardSnapshot {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_blocked_sql_injection_becomes_critical_alert() {
        let mut view = DashboardView::new("localhost:8006");
        view.apply_snapshot(&snapshot(
            r#"{"logs":[{"service":"web_frontend","attack_type":"sql_injection","status":"blocked","score":0.97,"threat_level":"high"}]}"#,
        ));

        assert_eq!(view.alerts.len(), 1);
        let alert = &view.alerts[0];
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.confidence, 97);
        assert!(alert.message.contains("SQL Injection detected"));
        assert!(alert.message.contains("Threat: HIGH"));
        assert_eq!(view.summary.blocked_alerts, 1);
        assert_eq!(view.summary.total_events, 1);
    }

    #[test]
    fn test_snapshot_selects_detection_engine() {
        let mut view = DashboardView::new("localhost:8006");
        view.apply_snapshot(&DashboardSnapshot::default());

        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.selected_node.as_deref(), Some(Node::DETECTION_ENGINE_ID));
        assert_eq!(view.telemetry.len(), 1);
    }

    #[test]
    fn test_upstream_total_preferred() {
        let mut view = DashboardView::new("engine");
        view.apply_snapshot(&snapshot(r#"{"logs":[{"status":"allowed"}],"total_logs":420}"#));
        assert_eq!(view.summary.total_events, 420);
    }

    #[test]
    fn test_failure_keeps_previous_state() {
        let mut view = DashboardView::new("engine");
        view.apply_snapshot(&snapshot(
            r#"{"logs":[{"status":"blocked","score":0.9},{"status":"allowed"}]}"#,
        ));
        let logs = view.logs.to_vec();
        let alerts = view.alerts.clone();
        let nodes = view.nodes.clone();

        view.record_failure("connection refused");

        assert!(view.unreachable);
        assert_eq!(view.logs.to_vec(), logs);
        assert_eq!(view.alerts, alerts);
        assert_eq!(view.nodes, nodes);
    }

    #[test]
    fn test_success_clears_unreachable() {
        let mut view = DashboardView::new("engine");
        view.record_failure("timeout");
        view.apply_snapshot(&DashboardSnapshot::default());
        assert!(!view.unreachable);
        assert!(view.last_error.is_none());
    }

    #[test]
    fn test_log_cap() {
        let mut view = DashboardView::new("engine");
        let snapshot = DashboardSnapshot {
            logs: (0..120)
                .map(|_| RawLogRecord {
                    status: Some("allowed".to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        view.apply_snapshot(&snapshot);
        assert_eq!(view.logs.len(), LOG_CAPACITY);
    }

    #[test]
    fn test_telemetry_ring() {
        let mut view = DashboardView::new("engine");
        for _ in 0..45 {
            view.apply_snapshot(&DashboardSnapshot::default());
        }
        assert_eq!(view.telemetry.len(), TELEMETRY_CAPACITY);
        assert!(view.telemetry.iter().all(|s| s.cpu <= 99.0));
    }

    #[test]
    fn test_events_applied() {
        let mut view = DashboardView::new("engine");
        view.apply_event(GatewayEvent::Telemetry(TelemetryEvent {
            device_id: None,
            timestamp: None,
            metrics: TelemetryMetrics {
                cpu: 120.0,
                memory: 50.0,
                network: 10.0,
            },
        }));
        view.apply_event(GatewayEvent::IpBlocked(IpBlockedEvent {
            ip: "10.66.1.20".to_string(),
            reason: Some("brute_force".to_string()),
            severity: Some("high".to_string()),
            expires_in: Some(3600),
        }));

        assert_eq!(view.telemetry.last().map(|s| s.cpu), Some(99.0));
        let log = view.logs.last().unwrap();
        assert!(log.message.contains("10.66.1.20"));
        assert_eq!(log.category, LogCategory::Error);
        assert_eq!(view.summary.total_events, 1);
    }

    fn alert_event(i: usize, severity: &str) -> GatewayEvent {
        GatewayEvent::Alert(AlertEvent {
            id: format!("a{}", i),
            title: "Suspicious login burst".to_string(),
            description: String::new(),
            severity: severity.to_string(),
            source: "auth_service".to_string(),
            timestamp: "2024-05-01T10:00:00Z".to_string(),
        })
    }

    #[test]
    fn test_pushed_alerts_bounded_by_log_cap() {
        let mut view = DashboardView::new("engine");
        view.apply_snapshot(&DashboardSnapshot::default());
        view.record_failure("connection refused");

        for i in 0..(LOG_CAPACITY * 3) {
            view.apply_event(alert_event(i, if i % 2 == 0 { "critical" } else { "medium" }));
        }

        assert_eq!(view.logs.len(), LOG_CAPACITY);
        assert!(view.alerts.len() <= LOG_CAPACITY);
        assert_eq!(view.alerts, derive_alerts(view.logs.iter()));
        let critical = view
            .alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count();
        assert_eq!(view.summary.blocked_alerts, critical);
        assert_eq!(critical, LOG_CAPACITY / 2);
    }

    #[test]
    fn test_pushed_alert_lands_in_logs() {
        let mut view = DashboardView::new("engine");
        view.apply_event(alert_event(0, "high"));

        let log = view.logs.last().unwrap();
        assert_eq!(log.status, "blocked");
        assert_eq!(log.service, "auth_service");
        assert_eq!(view.alerts.len(), 1);
        assert_eq!(view.alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(view.summary.blocked_alerts, 1);
    }
}
