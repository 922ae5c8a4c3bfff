//! HTTP API: console control, dashboard view, health and metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use guard_lib::{
    health::{ComponentStatus, HealthRegistry},
    AttackConfig, AttackConsole, AttackKind, DashboardView, GatewayEvent, StartOutcome,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub console: Arc<AttackConsole>,
    pub dashboard: Arc<RwLock<DashboardView>>,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        console: Arc<AttackConsole>,
        dashboard: Arc<RwLock<DashboardView>>,
    ) -> Self {
        Self {
            health_registry,
            console,
            dashboard,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub kind: AttackKind,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub outcome: StartOutcome,
    pub state: guard_lib::SimulationState,
}

/// A legacy gateway push event, as emitted on the realtime channel
#[derive(Debug, Deserialize)]
pub struct PushedEvent {
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub stopped: bool,
}

/// 200 while operational, 503 once a component is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

async fn dashboard_view(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.dashboard.read().await.clone();
    Json(view)
}

async fn push_event(
    State(state): State<Arc<AppState>>,
    Json(pushed): Json<PushedEvent>,
) -> impl IntoResponse {
    match GatewayEvent::decode(&pushed.event, pushed.payload) {
        Ok(Some(event)) => {
            state.dashboard.write().await.apply_event(event);
            StatusCode::ACCEPTED
        }
        Ok(None) => StatusCode::NO_CONTENT,
        Err(e) => {
            warn!(event = %pushed.event, error = %e, "Malformed gateway event");
            StatusCode::BAD_REQUEST
        }
    }
}

async fn simulation(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.console.snapshot().await)
}

async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(config): Json<AttackConfig>,
) -> impl IntoResponse {
    state.console.set_attack_config(config).await;
    Json(state.console.attack_config().await)
}

async fn start_attack(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> impl IntoResponse {
    let outcome = state.console.start_attack(request.kind).await;
    let status_code = match outcome {
        StartOutcome::Started => StatusCode::ACCEPTED,
        StartOutcome::AlreadyRunning => StatusCode::CONFLICT,
        StartOutcome::MissingTarget => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let body = StartResponse {
        outcome,
        state: state.console.state().await,
    };
    (status_code, Json(body))
}

async fn stop_attack(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stopped = state.console.stop().await;
    Json(StopResponse { stopped })
}

async fn ping(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.console.ping().await)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/dashboard/view", get(dashboard_view))
        .route("/api/dashboard/events", post(push_event))
        .route("/api/simulation", get(simulation))
        .route("/api/simulation/config", put(update_config))
        .route("/api/simulation/attack", post(start_attack))
        .route("/api/simulation/stop", post(stop_attack))
        .route("/api/simulation/ping", post(ping))
        .with_state(state)
}

pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting console API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
