//! Core library for the Server Guard operator console
//!
//! This crate provides the core functionality for:
//! - Attack simulation against the analysis endpoint
//! - Dashboard polling and log normalization
//! - Gateway HTTP client and endpoint selection
//! - Health checks and observability

pub mod buffer;
pub mod dashboard;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod health;
pub mod models;
pub mod observability;
pub mod simulation;
pub mod task;
pub mod traffic;

pub use buffer::BoundedBuffer;
pub use dashboard::{DashboardPoller, DashboardPollerBuilder, DashboardView, GatewayEvent};
pub use endpoints::{AttackRoute, EndpointConfig, Endpoints, Environment};
pub use error::GatewayError;
pub use gateway::{Gateway, HttpGateway};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ConsoleMetrics, StructuredLogger};
pub use simulation::{AttackConsole, ConsoleConfig, ConsoleSnapshot, PingReport, StartOutcome};
