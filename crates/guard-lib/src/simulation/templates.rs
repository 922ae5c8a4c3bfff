//! Per-attack synthetic log lines and request bodies

use crate::models::{AnalyzeRequest, AttackConfig, AttackKind, LogCategory, LogEntry};
use crate::traffic::{network_stats, server_metrics, NetworkMode, ServerMode};
use rand::seq::SliceRandom;
use rand::Rng;

const SQL_PAYLOADS: &[&str] = &[
    "' OR 1=1 --",
    "UNION SELECT username, password FROM users",
    "admin' --",
    "1; DROP TABLE production_logs",
    "' OR '1'='1",
    "SELECT * FROM data WHERE id=1 OR 1=1",
];

const USERNAMES: &[&str] = &["admin", "root", "administrator", "operator", "backup"];

const PASSWORDS: &[&str] = &[
    "123456", "password", "admin123", "letmein", "qwerty", "Winter2024!", "changeme",
];

const SCAN_PORTS: &[u16] = &[21, 22, 23, 25, 53, 80, 110, 143, 443, 445, 3306, 3389, 5432, 8080];

/// A log line with placeholders filled at render time
#[derive(Debug, Clone, Copy)]
pub struct LogTemplate {
    pub category: LogCategory,
    pub text: &'static str,
}

const fn line(category: LogCategory, text: &'static str) -> LogTemplate {
    LogTemplate { category, text }
}

const SQL_INJECTION: &[LogTemplate] = &[
    line(LogCategory::Info, "Injecting payload into parameter 'id': {payload}"),
    line(LogCategory::Info, "Probing {target}/login with tautology clause"),
    line(LogCategory::Warning, "Response size anomaly detected (+{n} bytes)"),
    line(LogCategory::Info, "Attempting UNION-based extraction on table 'users'"),
    line(LogCategory::Info, "Time-based blind probe: SLEEP({small}) on {target}"),
    line(LogCategory::Warning, "Database error leaked in response body"),
    line(LogCategory::System, "Payload mutation round {round} queued"),
];

const BRUTE_FORCE: &[LogTemplate] = &[
    line(LogCategory::Info, "Trying {user}:{password} against {target}"),
    line(LogCategory::Error, "Login failed for user '{user}' from {ip}"),
    line(LogCategory::Info, "Rotating source address to {ip}"),
    line(LogCategory::Warning, "Rate limit header observed (retry-after {small}s)"),
    line(LogCategory::Info, "Credential batch {round}: {n} combinations queued"),
    line(LogCategory::System, "Session cookie reset, resuming dictionary"),
];

const DDOS: &[LogTemplate] = &[
    line(LogCategory::Info, "Flooding {target} with SYN packets ({n} pkts/sec)"),
    line(LogCategory::Warning, "Target latency rising: {small}00 ms"),
    line(LogCategory::Info, "Botnet node {ip} joined the flood"),
    line(LogCategory::Info, "Packet batch {round} dispatched"),
    line(LogCategory::Warning, "Connection backlog saturated on {target}"),
    line(LogCategory::System, "Amplification vector switched to UDP/{port}"),
];

const PORT_SCAN: &[LogTemplate] = &[
    line(LogCategory::Info, "SYN probe {target}:{port}"),
    line(LogCategory::Success, "Port {port}/tcp open on {target}"),
    line(LogCategory::Info, "Port {port}/tcp filtered"),
    line(LogCategory::Info, "Service fingerprint requested on {port}/tcp"),
    line(LogCategory::Warning, "ICMP unreachable received from {ip}"),
    line(LogCategory::System, "Sweep progress: {n} ports scanned"),
];

/// Template table for an attack kind
pub fn templates(kind: AttackKind) -> &'static [LogTemplate] {
    match kind {
        AttackKind::SqlInjection => SQL_INJECTION,
        AttackKind::BruteForce => BRUTE_FORCE,
        AttackKind::Ddos => DDOS,
        AttackKind::PortScan => PORT_SCAN,
    }
}

/// Render the template selected by `counter` for `kind`
pub fn render<R: Rng + ?Sized>(
    kind: AttackKind,
    counter: u32,
    target: &str,
    rng: &mut R,
) -> LogEntry {
    let table = templates(kind);
    let template = table[counter as usize % table.len()];

    let text = template
        .text
        .replace("{target}", target)
        .replace("{payload}", pick(SQL_PAYLOADS, rng))
        .replace("{user}", pick(USERNAMES, rng))
        .replace("{password}", pick(PASSWORDS, rng))
        .replace("{ip}", &random_ip(rng))
        .replace(
            "{port}",
            &SCAN_PORTS.choose(rng).copied().unwrap_or(80).to_string(),
        )
        .replace("{n}", &rng.gen_range(100..10_000).to_string())
        .replace("{small}", &rng.gen_range(2..9).to_string())
        .replace("{round}", &(counter + 1).to_string());

    LogEntry::now(template.category, text)
}

/// Build the request body dispatched for an attack
pub fn build_request<R: Rng + ?Sized>(
    kind: AttackKind,
    config: &AttackConfig,
    rng: &mut R,
) -> AnalyzeRequest {
    let (service_type, payload, network, server) = match kind {
        AttackKind::SqlInjection => (
            "web_frontend",
            pick(SQL_PAYLOADS, rng).to_string(),
            NetworkMode::Normal,
            ServerMode::Normal,
        ),
        AttackKind::BruteForce => (
            "auth_service",
            format!(
                "POST /login username={}&password={}",
                pick(USERNAMES, rng),
                pick(PASSWORDS, rng)
            ),
            NetworkMode::Normal,
            ServerMode::Busy,
        ),
        AttackKind::Ddos => (
            "api_gateway",
            "TCP_FLOW_DATA_ONLY".to_string(),
            NetworkMode::Ddos,
            ServerMode::Crash,
        ),
        AttackKind::PortScan => (
            "firewall",
            "TCP SYN sweep ports 1-1024".to_string(),
            NetworkMode::HeavyLoad,
            ServerMode::Normal,
        ),
    };

    AnalyzeRequest {
        service_type: service_type.to_string(),
        attack_type: kind.as_str().to_string(),
        payload,
        network_data: Some(network_stats(network, rng)),
        server_metrics: Some(server_metrics(server, rng)),
        target: Some(config.target.trim().to_string()),
        request_count: Some(config.request_count),
        concurrency: Some(config.concurrency),
    }
}

fn pick<'a, R: Rng + ?Sized>(items: &[&'a str], rng: &mut R) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn random_ip<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("10.66.{}.{}", rng.gen_range(0..=255), rng.gen_range(10..=99))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_kind_has_templates() {
        for kind in AttackKind::ALL {
            assert!(!templates(kind).is_empty());
        }
    }

    #[test]
    fn test_render_fills_placeholders() {
        let mut rng = StdRng::seed_from_u64(1);
        for kind in AttackKind::ALL {
            for counter in 0..templates(kind).len() as u32 {
                let entry = render(kind, counter, "shop.local", &mut rng);
                assert!(!entry.message.contains('{'), "unfilled: {}", entry.message);
            }
        }
    }

    #[test]
    fn test_render_cycles_by_counter() {
        let mut rng = StdRng::seed_from_u64(1);
        let len = templates(AttackKind::PortScan).len() as u32;
        let first = render(AttackKind::PortScan, 0, "t", &mut rng);
        let wrapped = render(AttackKind::PortScan, len, "t", &mut rng);
        assert!(first.message.starts_with("SYN probe"));
        assert!(wrapped.message.starts_with("SYN probe"));
    }

    #[test]
    fn test_ddos_request_profile() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = AttackConfig {
            target: " 10.0.0.5 ".to_string(),
            ..Default::default()
        };
        let request = build_request(AttackKind::Ddos, &config, &mut rng);

        assert_eq!(request.service_type, "api_gateway");
        assert_eq!(request.attack_type, "ddos");
        assert_eq!(request.target.as_deref(), Some("10.0.0.5"));
        assert!(request.network_data.unwrap().syn_count >= 100);
        assert!(request.server_metrics.unwrap().cpu_usage >= 96);
    }

    #[test]
    fn test_sql_request_uses_payload_table() {
        let mut rng = StdRng::seed_from_u64(9);
        let request = build_request(AttackKind::SqlInjection, &AttackConfig::default(), &mut rng);
        assert!(SQL_PAYLOADS.contains(&request.payload.as_str()));
    }
}
