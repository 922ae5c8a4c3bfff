//! Prometheus metrics and structured event logging
//!
//! Metrics live in the prometheus default registry, so every
//! `ConsoleMetrics` handle shares the same series.

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Poll latency buckets (seconds)
const POLL_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

static GLOBAL_METRICS: OnceLock<ConsoleMetricsInner> = OnceLock::new();

struct ConsoleMetricsInner {
    poll_latency_seconds: Histogram,
    poll_failures: IntCounter,
    attacks_started: IntCounterVec,
    attacks_blocked: IntCounterVec,
    gateway_failures: IntCounter,
    active_alerts: IntGauge,
    blocked_alerts: IntGauge,
    dashboard_logs: IntGauge,
}

impl ConsoleMetricsInner {
    fn new() -> Self {
        Self {
            poll_latency_seconds: register_histogram!(
                "server_guard_poll_latency_seconds",
                "Time spent fetching and deriving one dashboard snapshot",
                POLL_BUCKETS.to_vec()
            )
            .expect("Failed to register poll_latency_seconds"),

            poll_failures: register_int_counter!(
                "server_guard_poll_failures_total",
                "Dashboard polls that could not reach the backend"
            )
            .expect("Failed to register poll_failures"),

            attacks_started: register_int_counter_vec!(
                "server_guard_attacks_started_total",
                "Simulated attacks started, by kind",
                &["kind"]
            )
            .expect("Failed to register attacks_started"),

            attacks_blocked: register_int_counter_vec!(
                "server_guard_attacks_blocked_total",
                "Simulated attacks the detection engine blocked, by kind",
                &["kind"]
            )
            .expect("Failed to register attacks_blocked"),

            gateway_failures: register_int_counter!(
                "server_guard_gateway_failures_total",
                "Attack requests that failed to reach the analysis endpoint"
            )
            .expect("Failed to register gateway_failures"),

            active_alerts: register_int_gauge!(
                "server_guard_active_alerts",
                "Alerts derived from the latest dashboard snapshot"
            )
            .expect("Failed to register active_alerts"),

            blocked_alerts: register_int_gauge!(
                "server_guard_blocked_alerts",
                "Critical alerts in the latest dashboard snapshot"
            )
            .expect("Failed to register blocked_alerts"),

            dashboard_logs: register_int_gauge!(
                "server_guard_dashboard_logs",
                "Normalized log entries held by the dashboard view"
            )
            .expect("Failed to register dashboard_logs"),
        }
    }
}

/// Cloneable handle to the global console metrics
#[derive(Clone)]
pub struct ConsoleMetrics {
    _private: (),
}

impl Default for ConsoleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ConsoleMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ConsoleMetricsInner {
        GLOBAL_METRICS.get_or_init(ConsoleMetricsInner::new)
    }

    pub fn observe_poll_latency(&self, duration_secs: f64) {
        self.inner().poll_latency_seconds.observe(duration_secs);
    }

    pub fn inc_poll_failures(&self) {
        self.inner().poll_failures.inc();
    }

    pub fn inc_attacks_started(&self, kind: &str) {
        self.inner().attacks_started.with_label_values(&[kind]).inc();
    }

    pub fn inc_attacks_blocked(&self, kind: &str) {
        self.inner().attacks_blocked.with_label_values(&[kind]).inc();
    }

    pub fn inc_gateway_failures(&self) {
        self.inner().gateway_failures.inc();
    }

    /// Update the gauges describing the current dashboard view
    pub fn set_dashboard(&self, logs: usize, alerts: usize, blocked: usize) {
        let inner = self.inner();
        inner.dashboard_logs.set(logs as i64);
        inner.active_alerts.set(alerts as i64);
        inner.blocked_alerts.set(blocked as i64);
    }
}

/// Event-tagged log records for significant console events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, environment: &str, attack_url: &str) {
        info!(
            event = "console_started",
            instance = %self.instance,
            version = %version,
            environment = %environment,
            attack_url = %attack_url,
            "Server Guard console started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "console_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Server Guard console shutting down"
        );
    }

    pub fn log_attack_started(&self, kind: &str, target: &str, request_count: u32) {
        info!(
            event = "attack_started",
            instance = %self.instance,
            kind = %kind,
            target = %target,
            request_count = request_count,
            "Attack simulation started"
        );
    }

    pub fn log_attack_blocked(&self, kind: &str, source: &str, threat_level: &str) {
        warn!(
            event = "attack_blocked",
            instance = %self.instance,
            kind = %kind,
            source = %source,
            threat_level = %threat_level,
            "Attack blocked by detection engine"
        );
    }

    /// Logged on reachability transitions only, not every cycle
    pub fn log_poll_status(&self, reachable: bool, error: Option<&str>) {
        if reachable {
            info!(
                event = "dashboard_poll",
                instance = %self.instance,
                reachable = true,
                "Dashboard service reachable"
            );
        } else {
            warn!(
                event = "dashboard_poll",
                instance = %self.instance,
                reachable = false,
                error = error.unwrap_or("unknown"),
                "Dashboard service unreachable, keeping previous view"
            );
        }
    }
}
