//! Environment-driven endpoint selection
//!
//! In development every backend service listens on its own fixed localhost
//! port. In production a single gateway host fronts all routes.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Fixed development ports
pub mod ports {
    pub const GATEWAY: u16 = 3001;
    pub const MODEL_SERVICE: u16 = 8006;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which route attack requests are posted to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackRoute {
    /// `POST /api/analyze` on the model service
    #[default]
    Analyze,
    /// `POST /attack` on the fleet gateway
    Gateway,
}

impl FromStr for AttackRoute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analyze" => Ok(AttackRoute::Analyze),
            "gateway" | "attack" => Ok(AttackRoute::Gateway),
            other => Err(format!("unknown attack route '{}'", other)),
        }
    }
}

impl fmt::Display for AttackRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackRoute::Analyze => write!(f, "analyze"),
            AttackRoute::Gateway => write!(f, "gateway"),
        }
    }
}

/// Inputs for endpoint resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub environment: Environment,
    /// Gateway base URL; required in production, overrides the
    /// development ports when set
    #[serde(default)]
    pub gateway_url: Option<String>,
    #[serde(default)]
    pub attack_route: AttackRoute,
}

/// Fully resolved endpoint URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub attack: Url,
    pub dashboard: Url,
    pub nodes: Url,
}

impl EndpointConfig {
    pub fn resolve(&self) -> Result<Endpoints, GatewayError> {
        match (&self.gateway_url, self.environment) {
            (Some(base), _) => {
                let base = normalize_base(base)?;
                Ok(Endpoints {
                    attack: base.join(self.attack_path())?,
                    dashboard: base.join("api/dashboard")?,
                    nodes: base.join("nodes")?,
                })
            }
            (None, Environment::Development) => {
                let gateway = local(ports::GATEWAY)?;
                let model = local(ports::MODEL_SERVICE)?;
                let attack = match self.attack_route {
                    AttackRoute::Analyze => model.join("api/analyze")?,
                    AttackRoute::Gateway => gateway.join("attack")?,
                };
                Ok(Endpoints {
                    attack,
                    dashboard: model.join("api/dashboard")?,
                    nodes: gateway.join("nodes")?,
                })
            }
            (None, Environment::Production) => Err(GatewayError::Config(
                "a gateway URL is required in production".to_string(),
            )),
        }
    }

    fn attack_path(&self) -> &'static str {
        match self.attack_route {
            AttackRoute::Analyze => "api/analyze",
            AttackRoute::Gateway => "attack",
        }
    }
}

fn local(port: u16) -> Result<Url, GatewayError> {
    Ok(Url::parse(&format!("http://localhost:{}/", port))?)
}

/// Ensure the base ends with a slash so joins append rather than replace
fn normalize_base(base: &str) -> Result<Url, GatewayError> {
    let trimmed = base.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::Config("gateway URL is empty".to_string()));
    }
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{}/", trimmed))?)
    }
}
