//! Core data models for the operator console

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity/color class of a console log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Info,
    Success,
    Warning,
    Error,
    System,
}

/// A single rendered log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
    pub category: LogCategory,
}

impl LogEntry {
    /// Create an entry stamped with the current local wall-clock time
    pub fn now(category: LogCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            category,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::now(LogCategory::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::now(LogCategory::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::now(LogCategory::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::now(LogCategory::Error, message)
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::now(LogCategory::System, message)
    }
}

/// Synthetic attack kinds offered by the simulation console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    SqlInjection,
    BruteForce,
    Ddos,
    PortScan,
}

impl AttackKind {
    pub const ALL: [AttackKind; 4] = [
        AttackKind::SqlInjection,
        AttackKind::BruteForce,
        AttackKind::Ddos,
        AttackKind::PortScan,
    ];

    /// Wire identifier, also used as the `attack_type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackKind::SqlInjection => "sql_injection",
            AttackKind::BruteForce => "brute_force",
            AttackKind::Ddos => "ddos",
            AttackKind::PortScan => "port_scan",
        }
    }

    /// Human-readable module name
    pub fn label(&self) -> &'static str {
        match self {
            AttackKind::SqlInjection => "SQL Injection",
            AttackKind::BruteForce => "Brute Force",
            AttackKind::Ddos => "DDoS Flood",
            AttackKind::PortScan => "Port Scan",
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sql_injection" | "sqli" => Ok(AttackKind::SqlInjection),
            "brute_force" => Ok(AttackKind::BruteForce),
            "ddos" => Ok(AttackKind::Ddos),
            "port_scan" => Ok(AttackKind::PortScan),
            other => Err(format!("unknown attack kind '{}'", other)),
        }
    }
}

/// Operator-editable attack parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub target: String,
    pub request_count: u32,
    pub concurrency: u32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            request_count: 100,
            concurrency: 10,
        }
    }
}

impl AttackConfig {
    /// A target consisting only of whitespace counts as missing
    pub fn has_target(&self) -> bool {
        !self.target.trim().is_empty()
    }
}

/// Simulation console state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SimulationState {
    Ready,
    Attacking,
    Blocked,
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationState::Ready => write!(f, "READY"),
            SimulationState::Attacking => write!(f, "ATTACKING"),
            SimulationState::Blocked => write!(f, "BLOCKED"),
        }
    }
}

/// One point on the dashboard resource chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub time: String,
    pub cpu: f64,
    pub memory: f64,
    pub net: f64,
}

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Alert derived from a blocked or warning log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: AlertSeverity,
    pub service: String,
    pub message: String,
    pub timestamp: String,
    /// Detection confidence, 0-100
    pub confidence: u8,
    pub ai_detected: bool,
    pub blocked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Degraded,
}

/// A monitored target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub address: String,
    pub kind: String,
    pub status: NodeStatus,
}

impl Node {
    pub const DETECTION_ENGINE_ID: &'static str = "detection-engine";

    /// The synthetic node standing in for the whole detection backend
    pub fn detection_engine(address: impl Into<String>) -> Self {
        Self {
            id: Self::DETECTION_ENGINE_ID.to_string(),
            name: "Detection Engine".to_string(),
            address: address.into(),
            kind: "ml-engine".to_string(),
            status: NodeStatus::Online,
        }
    }
}

/// Dashboard log record after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityLog {
    pub id: String,
    pub timestamp: String,
    pub service: String,
    pub status: String,
    pub threat_level: Option<String>,
    pub score: Option<f64>,
    pub source: Option<String>,
    pub message: String,
    pub category: LogCategory,
}

// Gateway wire types

/// Entry of the fleet registry behind `GET /nodes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryNode {
    pub node_id: String,
    pub ip: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRegistry {
    #[serde(default)]
    pub nodes: Vec<RegistryNode>,
}

impl From<RegistryNode> for Node {
    fn from(node: RegistryNode) -> Self {
        let address = match node.port {
            Some(port) => format!("{}:{}", node.ip, port),
            None => node.ip.clone(),
        };
        let status = match node.status.as_deref() {
            Some("online") => NodeStatus::Online,
            _ => NodeStatus::Degraded,
        };
        Node {
            name: node.hostname.unwrap_or_else(|| node.node_id.clone()),
            id: node.node_id,
            address,
            kind: node.sector.unwrap_or_else(|| "general".to_string()),
            status,
        }
    }
}

/// Flow statistics using the CIC-IDS feature names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    #[serde(rename = "Rate")]
    pub rate: f64,
    pub syn_count: u32,
    #[serde(rename = "IAT")]
    pub iat: f64,
    #[serde(rename = "Tot size")]
    pub total_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    pub cpu_usage: u32,
    pub ram_usage: u32,
}

/// Body of an analysis / attack request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub service_type: String,
    pub attack_type: String,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_data: Option<NetworkStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_metrics: Option<ServerMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
}

impl AnalyzeRequest {
    /// Minimal probe used by the health check
    pub fn probe() -> Self {
        Self {
            service_type: "health_check".to_string(),
            attack_type: "ping".to_string(),
            payload: "GET /health HTTP/1.1".to_string(),
            network_data: None,
            server_metrics: None,
            target: None,
            request_count: None,
            concurrency: None,
        }
    }
}

/// Analysis verdict; every field is optional upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub threat_level: Option<String>,
    #[serde(default)]
    pub web_ai_score: Option<f64>,
    #[serde(default)]
    pub net_ai_score: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Set by the fleet gateway route instead of `status`
    #[serde(default)]
    pub blocked: Option<bool>,
}

impl AnalyzeResponse {
    pub fn is_blocked(&self) -> bool {
        self.status.as_deref() == Some("blocked") || self.blocked == Some(true)
    }
}

/// Raw dashboard log record as produced by the detection backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLogRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, alias = "sector")]
    pub service: Option<String>,
    #[serde(default)]
    pub attack_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub threat_level: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Response of the dashboard snapshot endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub logs: Vec<RawLogRecord>,
    #[serde(default)]
    pub total_logs: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
