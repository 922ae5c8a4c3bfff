//! Daemon configuration from `GUARD_*` environment variables

use anyhow::{Context, Result};
use guard_lib::{AttackRoute, ConsoleConfig, EndpointConfig, Environment};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Instance name attached to structured log events
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Port for the console API, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// Gateway base URL; required in production
    #[serde(default)]
    pub gateway_url: Option<String>,

    #[serde(default)]
    pub attack_route: AttackRoute,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Fixed RNG seed for reproducible log streams
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_instance() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "server-guard".to_string())
}

fn default_api_port() -> u16 {
    8090
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    10
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(config::Environment::with_prefix("GUARD"))
    }

    pub fn load_from(source: config::Environment) -> Result<Self> {
        config::Config::builder()
            .add_source(source)
            .build()
            .context("failed to read GUARD_* environment")?
            .try_deserialize()
            .context("invalid console configuration")
    }

    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig {
            environment: self.environment,
            gateway_url: self.gateway_url.clone(),
            attack_route: self.attack_route,
        }
    }

    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            seed: self.seed,
            ..Default::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
