//! `sgctl dashboard`: one snapshot, or a live view with `--watch`

use anyhow::{Context, Result};
use colored::Colorize;
use guard_lib::{DashboardPollerBuilder, DashboardView, Gateway};
use std::sync::Arc;
use std::time::Duration;
use tabled::Tabled;
use tokio::sync::broadcast;

use crate::output::{
    color_confidence, color_status, print_json, print_table, print_warning, OutputFormat,
};

/// Log rows shown in table mode
const RECENT_LOGS: usize = 10;

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "AI")]
    ai: String,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

fn alert_rows(view: &DashboardView) -> Vec<AlertRow> {
    view.alerts
        .iter()
        .rev()
        .map(|alert| AlertRow {
            severity: color_status(&alert.severity.to_string()),
            service: alert.service.clone(),
            confidence: color_confidence(alert.confidence),
            ai: if alert.ai_detected { "yes" } else { "no" }.to_string(),
            message: alert.message.clone(),
        })
        .collect()
}

fn log_rows(view: &DashboardView) -> Vec<LogRow> {
    let logs = view.logs.to_vec();
    logs.iter()
        .rev()
        .take(RECENT_LOGS)
        .map(|log| LogRow {
            time: log.timestamp.clone(),
            service: log.service.clone(),
            status: color_status(&log.status),
            message: log.message.clone(),
        })
        .collect()
}

fn render(view: &DashboardView, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(view);
        return;
    }

    println!("{}", "Server Guard Dashboard".bold());
    println!("{}", "=".repeat(60));
    if view.unreachable {
        print_warning(
            view.last_error
                .as_deref()
                .unwrap_or("Dashboard service unreachable"),
        );
    }
    println!(
        "Events: {}   Blocked: {}   Alerts: {}",
        view.summary.total_events.to_string().cyan(),
        view.summary.blocked_alerts.to_string().red(),
        view.alerts.len()
    );
    if let Some(sample) = view.telemetry.last() {
        println!(
            "CPU {:.0}%   Memory {:.0}%   Network {:.0} KB/s",
            sample.cpu, sample.memory, sample.net
        );
    }
    if let Some(node) = view.nodes.first() {
        println!("Node: {} ({})", node.name.cyan(), node.address);
    }

    println!("\n{}", "Alerts".bold());
    print_table(alert_rows(view), &view.alerts, format);
    println!("\n{}", "Recent logs".bold());
    print_table(log_rows(view), &view.logs, format);
}

pub async fn show_dashboard(gateway: Arc<dyn Gateway>, format: OutputFormat) -> Result<()> {
    let poller = DashboardPollerBuilder::new()
        .gateway(gateway)
        .build()?;
    poller
        .poll_once()
        .await
        .context("Dashboard service unreachable")?;

    let view = poller.view();
    let view = view.read().await;
    render(&view, format);
    Ok(())
}

/// Poll in the background and redraw until Ctrl-C
pub async fn watch_dashboard(
    gateway: Arc<dyn Gateway>,
    interval: Duration,
    format: OutputFormat,
) -> Result<()> {
    let poller = DashboardPollerBuilder::new()
        .gateway(gateway)
        .interval(interval)
        .build()?;
    let view = poller.view();

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = poller.spawn(shutdown_rx);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut redraw = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = redraw.tick() => {
                let view = view.read().await;
                if view.last_updated.is_none() && !view.unreachable {
                    continue;
                }
                if format == OutputFormat::Table {
                    // Clear screen, cursor home
                    print!("\x1B[2J\x1B[H");
                }
                render(&view, format);
            }
            _ = &mut ctrl_c => break,
        }
    }

    let _ = shutdown_tx.send(());
    handle.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guard_lib::DashboardSnapshot;

    #[test]
    fn test_rows_most_recent_first() {
        let snapshot: DashboardSnapshot = serde_json::from_str(
            r#"{"logs":[
                {"id":"a","status":"blocked","score":0.9,"attack_type":"ddos"},
                {"id":"b","status":"allowed"},
                {"id":"c","status":"warning","score":0.6}
            ]}"#,
        )
        .unwrap();
        let mut view = DashboardView::new("engine");
        view.apply_snapshot(&snapshot);

        colored::control::set_override(false);
        let alerts = alert_rows(&view);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, "warning");
        assert_eq!(alerts[1].confidence, "90%");

        let logs = log_rows(&view);
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].status, "warning");
    }
}
