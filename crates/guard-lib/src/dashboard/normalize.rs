//! Log normalization and alert derivation
//!
//! Raw records come from several backend services with inconsistent
//! shapes. Missing fields fall back to defaults instead of failing.

use crate::models::{
    Alert, AlertSeverity, LogCategory, RawLogRecord, SecurityLog, TelemetrySample,
};

const SERVICE_LABELS: &[(&str, &str)] = &[
    ("web_frontend", "Web Frontend"),
    ("web_server", "Web Server"),
    ("api_gateway", "API Gateway"),
    ("auth_service", "Auth Service"),
    ("database", "Database"),
    ("firewall", "Firewall"),
    ("network", "Network Edge"),
    ("healthcare", "Healthcare Systems"),
    ("urban", "Urban Infrastructure"),
    ("agriculture", "Agriculture Sensors"),
];

const ATTACK_DESCRIPTIONS: &[(&str, &str)] = &[
    ("sql_injection", "SQL Injection detected"),
    ("xss", "Cross-site scripting attempt detected"),
    ("brute_force", "Brute force login attempt detected"),
    ("ddos", "DDoS flood pattern detected"),
    ("port_scan", "Port scan detected"),
    ("malware", "Malware signature detected"),
    ("anomaly", "Anomalous behaviour detected"),
];

/// Description used when a record carries neither attack type nor message
pub const DEFAULT_DESCRIPTION: &str = "Request processed";

/// Map a raw service identifier to its display label
pub fn service_label(raw: &str) -> String {
    SERVICE_LABELS
        .iter()
        .find(|(key, _)| *key == raw)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Map a raw attack code to its description
pub fn attack_description(raw: &str) -> String {
    ATTACK_DESCRIPTIONS
        .iter()
        .find(|(key, _)| *key == raw)
        .map(|(_, description)| description.to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn category_for(status: &str) -> LogCategory {
    match status {
        "blocked" => LogCategory::Error,
        "warning" => LogCategory::Warning,
        "allowed" => LogCategory::Success,
        _ => LogCategory::Info,
    }
}

fn compose_message(record: &RawLogRecord, status: &str) -> String {
    let description = match (&record.attack_type, &record.message) {
        (Some(code), _) if !code.is_empty() => attack_description(code),
        (_, Some(message)) if !message.is_empty() => message.clone(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    };

    let mut message = description;
    if !status.is_empty() {
        message.push_str(&format!(" | Status: {}", status.to_uppercase()));
    }
    if let Some(level) = record.threat_level.as_deref() {
        if !level.is_empty() && !level.eq_ignore_ascii_case("low") {
            message.push_str(&format!(" | Threat: {}", level.to_uppercase()));
        }
    }
    message
}

/// Normalize one raw record; `index` supplies an id when upstream has none
pub fn normalize(record: &RawLogRecord, index: usize) -> SecurityLog {
    let status = record.status.clone().unwrap_or_default().to_lowercase();

    let id = match &record.id {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => format!("log-{}", index),
        Some(other) => other.to_string(),
    };

    let service = record
        .service
        .as_deref()
        .map(service_label)
        .unwrap_or_else(|| "Unknown Service".to_string());

    SecurityLog {
        id,
        timestamp: record
            .timestamp
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        service,
        message: compose_message(record, &status),
        category: category_for(&status),
        threat_level: record.threat_level.clone(),
        score: record.score,
        source: record.source.clone(),
        status,
    }
}

/// Normalize a batch, keeping only the most recent `limit` entries
pub fn normalize_all(records: &[RawLogRecord], limit: usize) -> Vec<SecurityLog> {
    let skip = records.len().saturating_sub(limit);
    records
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(index, record)| normalize(record, index))
        .collect()
}

/// Convert an upstream probability into a 0-100 confidence
pub fn confidence(score: Option<f64>) -> u8 {
    score
        .map(|s| (s * 100.0).round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

/// Alerts for every blocked or warning entry, in log order
pub fn derive_alerts<'a, I>(logs: I) -> Vec<Alert>
where
    I: IntoIterator<Item = &'a SecurityLog>,
{
    logs.into_iter()
        .filter(|log| log.status == "blocked" || log.status == "warning")
        .map(|log| Alert {
            id: format!("alert-{}", log.id),
            severity: if log.status == "blocked" {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            },
            service: log.service.clone(),
            message: log.message.clone(),
            timestamp: log.timestamp.clone(),
            confidence: confidence(log.score),
            ai_detected: log.score.is_some(),
            blocked: log.status == "blocked",
        })
        .collect()
}

/// Chart sample synthesized from log volume; bounded by construction
pub fn sample_from_volume(volume: usize) -> TelemetrySample {
    let volume = volume as f64;
    TelemetrySample {
        time: chrono::Local::now().format("%H:%M:%S").to_string(),
        cpu: (12.0 + volume * 1.7).min(99.0),
        memory: (35.0 + volume * 0.9).min(100.0),
        net: volume * 24.0,
    }
}
