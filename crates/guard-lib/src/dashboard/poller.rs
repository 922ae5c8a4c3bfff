//! Periodic dashboard polling
//!
//! Fetches a snapshot every interval and folds it into the shared view.
//! Fetch failures never leave the loop; they only flag the view.

use super::view::DashboardView;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::health::{components, HealthRegistry};
use crate::models::AlertSeverity;
use crate::observability::{ConsoleMetrics, StructuredLogger};
use crate::task::ScopedTask;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default poll period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

pub struct DashboardPoller {
    gateway: Arc<dyn Gateway>,
    view: Arc<RwLock<DashboardView>>,
    interval: Duration,
    metrics: ConsoleMetrics,
    logger: StructuredLogger,
    health: Option<HealthRegistry>,
}

impl DashboardPoller {
    /// Shared view updated by this poller
    pub fn view(&self) -> Arc<RwLock<DashboardView>> {
        self.view.clone()
    }

    /// Fetch once and apply the result to the view
    pub async fn poll_once(&self) -> Result<(), GatewayError> {
        let start = Instant::now();
        let result = self.gateway.dashboard().await;
        self.metrics
            .observe_poll_latency(start.elapsed().as_secs_f64());

        match result {
            Ok(snapshot) => {
                let mut view = self.view.write().await;
                view.apply_snapshot(&snapshot);
                let critical = view
                    .alerts
                    .iter()
                    .filter(|a| a.severity == AlertSeverity::Critical)
                    .count();
                self.metrics
                    .set_dashboard(view.logs.len(), view.alerts.len(), critical);
                drop(view);

                if let Some(health) = &self.health {
                    health.set_healthy(components::POLLER).await;
                }
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_poll_failures();
                self.view
                    .write()
                    .await
                    .record_failure(format!("Dashboard service unreachable: {}", e));

                if let Some(health) = &self.health {
                    health
                        .set_degraded(components::POLLER, format!("Dashboard service unreachable: {}", e))
                        .await;
                }
                Err(e)
            }
        }
    }

    /// Poll until `shutdown` fires or its sender is dropped. The first
    /// cycle runs immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting dashboard poller"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reachable: Option<bool> = None;
        let mut cycles = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let result = self.poll_once().await;
                    cycles += 1;

                    let now_reachable = result.is_ok();
                    if reachable != Some(now_reachable) {
                        let error = result.as_ref().err().map(|e| e.to_string());
                        self.logger.log_poll_status(now_reachable, error.as_deref());
                        reachable = Some(now_reachable);
                    }

                    if cycles % 30 == 0 {
                        debug!(cycles, reachable = now_reachable, "Dashboard poll cycle");
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutting down dashboard poller");
                    break;
                }
            }
        }
    }

    /// Run on a task that is aborted when the returned handle drops
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> ScopedTask {
        ScopedTask::spawn(self.run(shutdown))
    }
}

/// Builder for [`DashboardPoller`]
pub struct DashboardPollerBuilder {
    gateway: Option<Arc<dyn Gateway>>,
    view: Option<Arc<RwLock<DashboardView>>>,
    engine_address: String,
    interval: Duration,
    logger: Option<StructuredLogger>,
    health: Option<HealthRegistry>,
}

impl DashboardPollerBuilder {
    pub fn new() -> Self {
        Self {
            gateway: None,
            view: None,
            engine_address: "detection-engine".to_string(),
            interval: DEFAULT_POLL_INTERVAL,
            logger: None,
            health: None,
        }
    }

    pub fn gateway(mut self, gateway: Arc<dyn Gateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Share an existing view instead of creating one
    pub fn view(mut self, view: Arc<RwLock<DashboardView>>) -> Self {
        self.view = Some(view);
        self
    }

    /// Address shown on the synthetic detection-engine node
    pub fn engine_address(mut self, address: impl Into<String>) -> Self {
        self.engine_address = address.into();
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn build(self) -> Result<DashboardPoller, GatewayError> {
        let gateway = self
            .gateway
            .ok_or_else(|| GatewayError::Config("Gateway is required".to_string()))?;
        if self.interval.is_zero() {
            return Err(GatewayError::Config(
                "Poll interval must be positive".to_string(),
            ));
        }

        let engine_address = self.engine_address;
        Ok(DashboardPoller {
            gateway,
            view: self
                .view
                .unwrap_or_else(|| Arc::new(RwLock::new(DashboardView::new(engine_address)))),
            interval: self.interval,
            metrics: ConsoleMetrics::new(),
            logger: self
                .logger
                .unwrap_or_else(|| StructuredLogger::new("dashboard")),
            health: self.health,
        })
    }
}

impl Default for DashboardPollerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
