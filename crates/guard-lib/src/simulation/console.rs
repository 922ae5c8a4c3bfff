//! Attack simulation console
//!
//! Drives the READY → ATTACKING → {READY, BLOCKED} state machine. Each attack
//! issues one request to the analysis endpoint while an independent timer
//! appends synthetic log lines. The response (or its absence) decides the
//! final state.

use super::templates;
use crate::buffer::BoundedBuffer;
use crate::gateway::Gateway;
use crate::health::{components, HealthRegistry};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, AttackConfig, AttackKind, LogEntry, SimulationState,
};
use crate::observability::{ConsoleMetrics, StructuredLogger};
use crate::task::ScopedTask;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info, warn};

/// Message appended when an attack is requested without a target
pub const MISSING_TARGET_MESSAGE: &str =
    "Error: No target specified. Please enter a target URL or IP address.";

/// Configuration for the simulation console
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Lower bound of the synthetic log period (default: 800 ms)
    pub tick_min: Duration,
    /// Upper bound of the synthetic log period (default: 1500 ms)
    pub tick_max: Duration,
    /// Synthetic lines emitted before the timer stops itself
    pub max_ticks: u32,
    /// Delay between a verdict and the forced return to READY
    pub reset_delay: Duration,
    /// Console log capacity
    pub log_capacity: usize,
    /// Seed for template and traffic randomness; entropy when unset
    pub seed: Option<u64>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            tick_min: Duration::from_millis(800),
            tick_max: Duration::from_millis(1500),
            max_ticks: 15,
            reset_delay: Duration::from_millis(3000),
            log_capacity: 100,
            seed: None,
        }
    }
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    Started,
    /// An attack is already active; nothing changed
    AlreadyRunning,
    /// Rejected locally; one error line was logged
    MissingTarget,
}

/// Result of a health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingReport {
    pub reachable: bool,
    pub latency_ms: u64,
    pub status: Option<String>,
}

/// Point-in-time view of the console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSnapshot {
    pub state: SimulationState,
    pub active: Option<AttackKind>,
    pub config: AttackConfig,
    pub logs: Vec<LogEntry>,
    pub timer_active: bool,
    /// The attack request has not been answered yet
    pub awaiting_response: bool,
}

struct ConsoleInner {
    state: SimulationState,
    active: Option<AttackKind>,
    config: AttackConfig,
    logs: BoundedBuffer<LogEntry>,
    log_tx: broadcast::Sender<LogEntry>,
    /// Identifies the current attack; bumped on every start and stop
    run_id: u64,
    ticks: u32,
    ticker: Option<ScopedTask>,
    reset: Option<ScopedTask>,
    request_pending: bool,
    offline: bool,
    rng: StdRng,
}

impl ConsoleInner {
    fn push(&mut self, entry: LogEntry) {
        // No subscribers is fine
        let _ = self.log_tx.send(entry.clone());
        self.logs.push(entry);
    }

    fn is_current(&self, run_id: u64) -> bool {
        self.run_id == run_id && self.state != SimulationState::Ready
    }

    fn timer_active(&self) -> bool {
        self.ticker.as_ref().map_or(false, |t| !t.is_finished())
    }

    fn cancel_timers(&mut self) {
        self.ticker.take();
        self.reset.take();
    }

    fn settle(&mut self) {
        self.state = SimulationState::Ready;
        self.active = None;
        self.request_pending = false;
        self.offline = false;
    }

    fn render_verdict(&mut self, kind: AttackKind, verdict: &AnalyzeResponse) {
        let threat = verdict
            .threat_level
            .as_deref()
            .unwrap_or("N/A")
            .to_uppercase();

        if verdict.is_blocked() {
            self.state = SimulationState::Blocked;
            self.push(LogEntry::error(format!(
                "BLOCKED by {} | {} denied | Threat: {} | Web AI: {} | Net AI: {}",
                verdict.source.as_deref().unwrap_or("Server Guard"),
                kind.label(),
                threat,
                format_score(verdict.web_ai_score.or(verdict.score)),
                format_score(verdict.net_ai_score),
            )));
        } else {
            self.push(LogEntry::success(format!(
                "Request allowed by target | {} passed through | Threat: {}",
                kind.label(),
                threat,
            )));
        }
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.0}%", s * 100.0),
        None => "N/A".to_string(),
    }
}

/// The attack simulation console
///
/// Dropping the console cancels its timers; spawned tasks only hold weak
/// references to the shared state.
pub struct AttackConsole {
    inner: Arc<Mutex<ConsoleInner>>,
    gateway: Arc<dyn Gateway>,
    config: ConsoleConfig,
    metrics: ConsoleMetrics,
    logger: StructuredLogger,
    health: Option<HealthRegistry>,
    log_tx: broadcast::Sender<LogEntry>,
}

/// Shared by the request task
#[derive(Clone)]
struct Reporting {
    metrics: ConsoleMetrics,
    logger: StructuredLogger,
    health: Option<HealthRegistry>,
}

impl AttackConsole {
    pub fn new(gateway: Arc<dyn Gateway>, config: ConsoleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (log_tx, _) = broadcast::channel(config.log_capacity.max(16));

        let inner = ConsoleInner {
            state: SimulationState::Ready,
            active: None,
            config: AttackConfig::default(),
            logs: BoundedBuffer::new(config.log_capacity),
            log_tx: log_tx.clone(),
            run_id: 0,
            ticks: 0,
            ticker: None,
            reset: None,
            request_pending: false,
            offline: false,
            rng,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            gateway,
            config,
            metrics: ConsoleMetrics::new(),
            logger: StructuredLogger::new("console"),
            health: None,
            log_tx,
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Report analysis endpoint reachability as the simulator component
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    /// Receive every log line appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.log_tx.subscribe()
    }

    pub async fn state(&self) -> SimulationState {
        self.inner.lock().await.state
    }

    pub async fn attack_config(&self) -> AttackConfig {
        self.inner.lock().await.config.clone()
    }

    /// Replace the attack parameters; takes effect on the next start
    pub async fn set_attack_config(&self, config: AttackConfig) {
        self.inner.lock().await.config = config;
    }

    pub async fn set_target(&self, target: impl Into<String>) {
        self.inner.lock().await.config.target = target.into();
    }

    pub async fn snapshot(&self) -> ConsoleSnapshot {
        let inner = self.inner.lock().await;
        ConsoleSnapshot {
            state: inner.state,
            active: inner.active,
            config: inner.config.clone(),
            logs: inner.logs.to_vec(),
            timer_active: inner.timer_active(),
            awaiting_response: inner.request_pending,
        }
    }

    /// Start an attack of the given kind
    pub async fn start_attack(&self, kind: AttackKind) -> StartOutcome {
        let mut inner = self.inner.lock().await;

        if inner.state != SimulationState::Ready || inner.active.is_some() {
            debug!(requested = %kind, active = ?inner.active, "Attack already in progress");
            return StartOutcome::AlreadyRunning;
        }

        if !inner.config.has_target() {
            inner.push(LogEntry::error(MISSING_TARGET_MESSAGE));
            return StartOutcome::MissingTarget;
        }

        inner.cancel_timers();
        inner.run_id += 1;
        inner.ticks = 0;
        inner.state = SimulationState::Attacking;
        inner.active = Some(kind);
        inner.request_pending = true;
        inner.offline = false;

        let run_id = inner.run_id;
        let target = inner.config.target.trim().to_string();
        let request_count = inner.config.request_count;
        inner.push(LogEntry::system(format!(
            "Initializing {} module...",
            kind.label()
        )));
        let acquired = format!(
            "Target acquired: {} ({} requests, concurrency {})",
            target, inner.config.request_count, inner.config.concurrency
        );
        inner.push(LogEntry::info(acquired));

        let request = {
            let ConsoleInner { config, rng, .. } = &mut *inner;
            templates::build_request(kind, config, rng)
        };
        let period = self.pick_period(&mut inner.rng);

        inner.ticker = Some(ScopedTask::spawn(run_ticker(
            Arc::downgrade(&self.inner),
            run_id,
            kind,
            target.clone(),
            period,
            self.config.max_ticks,
        )));
        drop(inner);

        // Fire-and-forget; stale verdicts are discarded by run id
        tokio::spawn(run_request(
            Arc::downgrade(&self.inner),
            self.gateway.clone(),
            run_id,
            kind,
            request,
            self.config.reset_delay,
            Reporting {
                metrics: self.metrics.clone(),
                logger: self.logger.clone(),
                health: self.health.clone(),
            },
        ));

        self.metrics.inc_attacks_started(kind.as_str());
        self.logger
            .log_attack_started(kind.as_str(), &target, request_count);
        debug!(attack = %kind, period_ms = period.as_millis() as u64, "Synthetic log timer armed");

        StartOutcome::Started
    }

    /// Operator abort. Returns false when there was nothing to stop.
    pub async fn stop(&self) -> bool {
        let mut inner = self.inner.lock().await;

        if inner.state == SimulationState::Ready {
            return false;
        }

        inner.cancel_timers();
        inner.run_id += 1;
        let kind = inner.active;
        inner.settle();

        inner.push(LogEntry::warning(match kind {
            Some(kind) => format!("Attack aborted by operator. {} module terminated.", kind.label()),
            None => "Attack aborted by operator.".to_string(),
        }));
        inner.push(LogEntry::system("System idle. Ready for next simulation."));

        info!(attack = ?kind, "Attack simulation stopped by operator");
        true
    }

    /// Probe the analysis endpoint without touching the attack state
    pub async fn ping(&self) -> PingReport {
        let location = self.gateway.analyze_location();
        let started = Instant::now();
        let result = self.gateway.analyze(&AnalyzeRequest::probe()).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        if let Some(health) = &self.health {
            match &result {
                Ok(_) => health.set_healthy(components::GATEWAY).await,
                Err(e) => health.set_degraded(components::GATEWAY, e.to_string()).await,
            }
        }

        let mut inner = self.inner.lock().await;
        match result {
            Ok(verdict) => {
                let status = verdict.status.clone();
                inner.push(LogEntry::success(format!(
                    "Pong from {} in {} ms (status: {})",
                    location,
                    latency_ms,
                    status.as_deref().unwrap_or("N/A")
                )));
                PingReport {
                    reachable: true,
                    latency_ms,
                    status,
                }
            }
            Err(e) => {
                if e.is_unreachable() {
                    inner.push(LogEntry::error(format!(
                        "Error: Connection refused at {}",
                        location
                    )));
                } else {
                    inner.push(LogEntry::error(format!("Error: Ping failed: {}", e)));
                }
                warn!(error = %e, endpoint = %location, "Ping failed");
                PingReport {
                    reachable: false,
                    latency_ms,
                    status: None,
                }
            }
        }
    }

    fn pick_period(&self, rng: &mut StdRng) -> Duration {
        let min = self.config.tick_min.as_millis() as u64;
        let max = self.config.tick_max.as_millis() as u64;
        if max <= min {
            return self.config.tick_min;
        }
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

/// Synthetic log generator; stops itself after `max_ticks` lines
async fn run_ticker(
    inner: Weak<Mutex<ConsoleInner>>,
    run_id: u64,
    kind: AttackKind,
    target: String,
    period: Duration,
    max_ticks: u32,
) {
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        ticker.tick().await;

        let Some(shared) = inner.upgrade() else { return };
        let mut guard = shared.lock().await;
        if !guard.is_current(run_id) {
            return;
        }

        let counter = guard.ticks;
        let entry = templates::render(kind, counter, &target, &mut guard.rng);
        guard.push(entry);
        guard.ticks += 1;

        if guard.ticks < max_ticks {
            continue;
        }

        debug!(attack = %kind, ticks = guard.ticks, "Synthetic log stream exhausted");
        if guard.offline {
            complete_offline(&mut guard, kind);
        }
        if let Some(own) = guard.ticker.take() {
            own.detach();
        }
        return;
    }
}

fn complete_offline(inner: &mut ConsoleInner, kind: AttackKind) {
    let summary = format!(
        "{} simulation complete ({} events, offline mode)",
        kind.label(),
        inner.ticks
    );
    inner.push(LogEntry::success(summary));
    inner.push(LogEntry::system("System ready."));
    inner.settle();
}

async fn run_request(
    inner: Weak<Mutex<ConsoleInner>>,
    gateway: Arc<dyn Gateway>,
    run_id: u64,
    kind: AttackKind,
    request: AnalyzeRequest,
    reset_delay: Duration,
    reporting: Reporting,
) {
    let result = gateway.analyze(&request).await;

    if let Some(health) = &reporting.health {
        match &result {
            Ok(_) => health.set_healthy(components::SIMULATOR).await,
            Err(e) => {
                health
                    .set_degraded(components::SIMULATOR, format!("Analysis endpoint: {}", e))
                    .await
            }
        }
    }

    let Some(shared) = inner.upgrade() else { return };
    let mut guard = shared.lock().await;
    if !guard.is_current(run_id) {
        debug!(attack = %kind, run_id, "Discarding response for finished attack");
        return;
    }
    guard.request_pending = false;

    match result {
        Ok(verdict) => {
            guard.render_verdict(kind, &verdict);
            if verdict.is_blocked() {
                reporting.metrics.inc_attacks_blocked(kind.as_str());
                reporting.logger.log_attack_blocked(
                    kind.as_str(),
                    verdict.source.as_deref().unwrap_or("unknown"),
                    verdict.threat_level.as_deref().unwrap_or("unknown"),
                );
            }

            // Replacing a previous reset aborts it
            guard.reset = Some(ScopedTask::spawn(run_reset(inner.clone(), run_id, reset_delay)));
        }
        Err(e) => {
            reporting.metrics.inc_gateway_failures();
            warn!(attack = %kind, error = %e, "Analysis endpoint unavailable, simulating offline");
            guard.offline = true;
            let problem = if e.is_unreachable() {
                "Gateway unreachable"
            } else {
                "Gateway error"
            };
            guard.push(LogEntry::warning(format!(
                "Warning: {} at {} ({}). Continuing offline simulation.",
                problem,
                gateway.analyze_location(),
                e
            )));

            if !guard.timer_active() {
                complete_offline(&mut guard, kind);
            }
        }
    }
}

async fn run_reset(inner: Weak<Mutex<ConsoleInner>>, run_id: u64, delay: Duration) {
    sleep(delay).await;

    let Some(shared) = inner.upgrade() else { return };
    let mut guard = shared.lock().await;
    if !guard.is_current(run_id) {
        return;
    }

    guard.ticker.take();
    if let Some(own) = guard.reset.take() {
        own.detach();
    }
    guard.settle();
    guard.push(LogEntry::system("Simulation finished. System ready."));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::models::{DashboardSnapshot, LogCategory, Node};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behavior {
        Blocked,
        Allowed,
        Fail,
        Hang,
        /// Blocked verdict after the given delay
        Slow(Duration),
        /// Upstream error after the given delay
        FailAfter(Duration),
    }

    struct MockGateway {
        behavior: Behavior,
        attack_calls: AtomicUsize,
    }

    impl MockGateway {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                attack_calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.attack_calls.load(Ordering::SeqCst)
        }
    }

    fn blocked() -> AnalyzeResponse {
        AnalyzeResponse {
            status: Some("blocked".to_string()),
            threat_level: Some("critical".to_string()),
            web_ai_score: Some(0.97),
            source: Some("Web Gatekeeper".to_string()),
            ..Default::default()
        }
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, GatewayError> {
            if request.attack_type == "ping" {
                return Ok(AnalyzeResponse {
                    status: Some("allowed".to_string()),
                    ..Default::default()
                });
            }

            self.attack_calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Blocked => Ok(blocked()),
                Behavior::Allowed => Ok(AnalyzeResponse {
                    status: Some("allowed".to_string()),
                    threat_level: Some("low".to_string()),
                    ..Default::default()
                }),
                Behavior::Fail => Err(GatewayError::Config("connection refused".to_string())),
                Behavior::Hang => std::future::pending().await,
                Behavior::Slow(delay) => {
                    sleep(delay).await;
                    Ok(blocked())
                }
                Behavior::FailAfter(delay) => {
                    sleep(delay).await;
                    Err(GatewayError::Upstream("model service overloaded".to_string()))
                }
            }
        }

        async fn dashboard(&self) -> Result<DashboardSnapshot, GatewayError> {
            Ok(DashboardSnapshot::default())
        }

        async fn nodes(&self) -> Result<Vec<Node>, GatewayError> {
            Ok(vec![])
        }

        fn analyze_location(&self) -> String {
            "http://mock/api/analyze".to_string()
        }
    }

    fn test_config() -> ConsoleConfig {
        ConsoleConfig {
            tick_min: Duration::from_millis(1000),
            tick_max: Duration::from_millis(1000),
            seed: Some(42),
            ..Default::default()
        }
    }

    async fn console_with(behavior: Behavior) -> (AttackConsole, Arc<MockGateway>) {
        let gateway = MockGateway::new(behavior);
        let console = AttackConsole::new(gateway.clone(), test_config());
        console.set_target("shop.example.com").await;
        (console, gateway)
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_target_logs_single_error() {
        let gateway = MockGateway::new(Behavior::Blocked);
        let console = AttackConsole::new(gateway.clone(), test_config());

        let outcome = console.start_attack(AttackKind::SqlInjection).await;
        sleep(Duration::from_millis(10)).await;

        let snapshot = console.snapshot().await;
        assert_eq!(outcome, StartOutcome::MissingTarget);
        assert_eq!(snapshot.state, SimulationState::Ready);
        assert_eq!(snapshot.active, None);
        assert_eq!(snapshot.logs.len(), 1);
        assert_eq!(snapshot.logs[0].category, LogCategory::Error);
        assert!(snapshot.logs[0].message.starts_with("Error: No target specified"));
        assert!(!snapshot.timer_active);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_target_rejected() {
        let (console, gateway) = console_with(Behavior::Blocked).await;
        console.set_target("   ").await;

        let outcome = console.start_attack(AttackKind::Ddos).await;
        assert_eq!(outcome, StartOutcome::MissingTarget);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_noop() {
        let (console, gateway) = console_with(Behavior::Hang).await;

        assert_eq!(console.start_attack(AttackKind::SqlInjection).await, StartOutcome::Started);
        let logs_after_first = console.snapshot().await.logs.len();

        assert_eq!(console.start_attack(AttackKind::Ddos).await, StartOutcome::AlreadyRunning);
        sleep(Duration::from_millis(10)).await;

        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.active, Some(AttackKind::SqlInjection));
        assert_eq!(snapshot.logs.len(), logs_after_first);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_verdict_then_reset() {
        let (console, _gateway) = console_with(Behavior::Blocked).await;

        console.start_attack(AttackKind::SqlInjection).await;
        sleep(Duration::from_millis(10)).await;

        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Blocked);
        let denial = snapshot
            .logs
            .iter()
            .find(|l| l.message.starts_with("BLOCKED"))
            .expect("denial line");
        assert_eq!(denial.category, LogCategory::Error);
        assert!(denial.message.contains("Web AI: 97%"));
        assert!(denial.message.contains("Net AI: N/A"));

        // Blocked still counts as busy
        assert_eq!(console.start_attack(AttackKind::Ddos).await, StartOutcome::AlreadyRunning);

        sleep(Duration::from_millis(3100)).await;
        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Ready);
        assert_eq!(snapshot.active, None);
        assert!(!snapshot.timer_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_allowed_verdict_stays_attacking_until_reset() {
        let (console, _gateway) = console_with(Behavior::Allowed).await;

        console.start_attack(AttackKind::BruteForce).await;
        sleep(Duration::from_millis(10)).await;

        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Attacking);
        assert!(snapshot
            .logs
            .iter()
            .any(|l| l.category == LogCategory::Success && l.message.contains("allowed")));

        sleep(Duration::from_millis(3100)).await;
        assert_eq!(console.state().await, SimulationState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_degrades_to_offline() {
        let (console, _gateway) = console_with(Behavior::Fail).await;

        console.start_attack(AttackKind::PortScan).await;
        sleep(Duration::from_millis(10)).await;

        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Attacking);
        assert!(snapshot.timer_active);
        assert!(snapshot
            .logs
            .iter()
            .any(|l| l.category == LogCategory::Warning && l.message.contains("offline")));

        // 15 ticks at 1s each
        sleep(Duration::from_millis(15_500)).await;
        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Ready);
        assert!(!snapshot.timer_active);
        assert!(snapshot.logs.iter().any(|l| l.message.contains("offline mode")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transport_failure_not_reported_unreachable() {
        let (console, _gateway) = console_with(Behavior::Fail).await;

        console.start_attack(AttackKind::SqlInjection).await;
        sleep(Duration::from_millis(10)).await;

        let warning = console
            .snapshot()
            .await
            .logs
            .into_iter()
            .find(|l| l.category == LogCategory::Warning)
            .expect("offline warning");
        assert!(warning.message.starts_with("Warning: Gateway error at http://mock/api/analyze"));
        assert!(!warning.message.contains("unreachable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_failure_completes_after_timer() {
        let (console, _gateway) = console_with(Behavior::FailAfter(Duration::from_secs(30))).await;

        console.start_attack(AttackKind::BruteForce).await;

        // Timer exhausted at 15s, request still pending
        sleep(Duration::from_secs(25)).await;
        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Attacking);
        assert!(!snapshot.timer_active);
        assert!(snapshot.awaiting_response);
        assert!(!snapshot.logs.iter().any(|l| l.message.contains("offline mode")));

        sleep(Duration::from_secs(6)).await;
        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Ready);
        assert_eq!(snapshot.active, None);
        assert!(snapshot
            .logs
            .iter()
            .any(|l| l.category == LogCategory::Success && l.message.contains("offline mode")));
        assert_eq!(
            snapshot.logs.last().map(|l| l.message.as_str()),
            Some("System ready.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_caps_iterations() {
        let (console, _gateway) = console_with(Behavior::Hang).await;

        console.start_attack(AttackKind::Ddos).await;
        let initial = console.snapshot().await.logs.len();

        sleep(Duration::from_secs(60)).await;
        let snapshot = console.snapshot().await;

        assert_eq!(snapshot.logs.len(), initial + 15);
        assert!(!snapshot.timer_active);
        // A hanging request keeps the attack open
        assert_eq!(snapshot.state, SimulationState::Attacking);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let (console, _gateway) = console_with(Behavior::Hang).await;

        console.start_attack(AttackKind::SqlInjection).await;
        sleep(Duration::from_millis(2500)).await;

        assert!(console.stop().await);
        let after_first = console.snapshot().await;
        assert_eq!(after_first.state, SimulationState::Ready);
        assert_eq!(after_first.active, None);
        assert!(!after_first.timer_active);
        let tail: Vec<_> = after_first.logs.iter().rev().take(2).collect();
        assert!(tail[0].message.starts_with("System idle"));
        assert!(tail[1].message.starts_with("Attack aborted"));

        assert!(!console.stop().await);
        let after_second = console.snapshot().await;
        assert_eq!(after_second.logs.len(), after_first.logs.len());

        // No further synthetic lines after the stop
        sleep(Duration::from_secs(5)).await;
        assert_eq!(console.snapshot().await.logs.len(), after_first.logs.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let (console, _gateway) = console_with(Behavior::Slow(Duration::from_secs(4))).await;

        console.start_attack(AttackKind::SqlInjection).await;
        sleep(Duration::from_secs(1)).await;
        console.stop().await;

        sleep(Duration::from_secs(10)).await;
        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Ready);
        assert!(!snapshot.logs.iter().any(|l| l.message.starts_with("BLOCKED")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let (console, gateway) = console_with(Behavior::Hang).await;

        console.start_attack(AttackKind::SqlInjection).await;
        console.stop().await;
        assert_eq!(console.start_attack(AttackKind::Ddos).await, StartOutcome::Started);
        sleep(Duration::from_millis(10)).await;

        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.active, Some(AttackKind::Ddos));
        assert!(snapshot.timer_active);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ping_does_not_disturb_attack() {
        let (console, _gateway) = console_with(Behavior::Hang).await;

        console.start_attack(AttackKind::BruteForce).await;
        let report = console.ping().await;

        assert!(report.reachable);
        assert_eq!(report.status.as_deref(), Some("allowed"));
        let snapshot = console.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Attacking);
        assert_eq!(snapshot.active, Some(AttackKind::BruteForce));
        assert!(snapshot.timer_active);
        assert!(snapshot.logs.iter().any(|l| l.message.starts_with("Pong from")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_cap() {
        let gateway = MockGateway::new(Behavior::Blocked);
        let console = AttackConsole::new(gateway, test_config());

        for _ in 0..250 {
            console.start_attack(AttackKind::SqlInjection).await;
        }

        assert_eq!(console.snapshot().await.logs.len(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_receive_lines() {
        let gateway = MockGateway::new(Behavior::Blocked);
        let console = AttackConsole::new(gateway, test_config());
        let mut rx = console.subscribe();

        console.start_attack(AttackKind::SqlInjection).await;

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.message, MISSING_TARGET_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_degrades_simulator_health() {
        let health = HealthRegistry::new();
        let gateway = MockGateway::new(Behavior::Fail);
        let console = AttackConsole::new(gateway, test_config()).with_health(health.clone());
        console.set_target("10.0.0.5").await;

        console.start_attack(AttackKind::Ddos).await;
        sleep(Duration::from_millis(10)).await;

        let report = health.health().await;
        assert_eq!(
            report.components[components::SIMULATOR].status,
            crate::health::ComponentStatus::Degraded
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (console, _gateway) = console_with(Behavior::Hang).await;
        console.start_attack(AttackKind::Ddos).await;

        let weak = Arc::downgrade(&console.inner);
        drop(console);
        sleep(Duration::from_secs(2)).await;

        assert!(weak.upgrade().is_none());
    }
}
