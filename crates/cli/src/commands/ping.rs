//! `sgctl ping`

use anyhow::{bail, Result};
use guard_lib::{AttackConsole, ConsoleConfig, Gateway};
use std::sync::Arc;

use crate::output::{print_json, print_success, OutputFormat};

pub async fn run_ping(gateway: Arc<dyn Gateway>, format: OutputFormat) -> Result<()> {
    let location = gateway.analyze_location();
    let console = AttackConsole::new(gateway, ConsoleConfig::default());
    let report = console.ping().await;

    if format == OutputFormat::Json {
        print_json(&report);
    }

    if !report.reachable {
        let detail = console
            .snapshot()
            .await
            .logs
            .last()
            .map(|entry| entry.message.clone())
            .unwrap_or_else(|| format!("Ping failed at {}", location));
        bail!(detail);
    }

    if format == OutputFormat::Table {
        print_success(&format!(
            "Pong from {} in {} ms (status: {})",
            location,
            report.latency_ms,
            report.status.as_deref().unwrap_or("N/A")
        ));
    }
    Ok(())
}
