//! `sgctl attack`: one simulation, streamed to the terminal

use anyhow::{bail, Result};
use guard_lib::{
    AttackConfig, AttackConsole, AttackKind, ConsoleConfig, Gateway, LogEntry, SimulationState,
    StartOutcome,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::output::{
    color_state, format_log_line, print_info, print_success, print_warning, OutputFormat,
};

/// How often the console state is checked for completion
const SETTLE_CHECK: Duration = Duration::from_millis(250);

pub struct AttackRequest {
    pub kind: AttackKind,
    pub target: String,
    pub request_count: u32,
    pub concurrency: u32,
    pub seed: Option<u64>,
}

fn emit(entry: &LogEntry, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", format_log_line(entry)),
        OutputFormat::Json => {
            if let Ok(line) = serde_json::to_string(entry) {
                println!("{}", line);
            }
        }
    }
}

fn drain(rx: &mut broadcast::Receiver<LogEntry>, format: OutputFormat) {
    loop {
        match rx.try_recv() {
            Ok(entry) => emit(&entry, format),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

/// Run the attack until the console settles back to READY.
/// Ctrl-C performs an operator stop.
pub async fn run_attack(
    gateway: Arc<dyn Gateway>,
    request: AttackRequest,
    format: OutputFormat,
) -> Result<()> {
    let console = AttackConsole::new(
        gateway,
        ConsoleConfig {
            seed: request.seed,
            ..Default::default()
        },
    );
    console
        .set_attack_config(AttackConfig {
            target: request.target,
            request_count: request.request_count,
            concurrency: request.concurrency,
        })
        .await;

    let mut rx = console.subscribe();
    match console.start_attack(request.kind).await {
        StartOutcome::Started => {}
        StartOutcome::MissingTarget => {
            drain(&mut rx, format);
            bail!("No target specified; pass --target or save one with `sgctl profile set --target`");
        }
        StartOutcome::AlreadyRunning => bail!("An attack is already running"),
    }

    let mut blocked = false;
    let mut aborted = false;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut settle = tokio::time::interval(SETTLE_CHECK);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(entry) => emit(&entry, format),
                Err(RecvError::Lagged(skipped)) => {
                    print_warning(&format!("{} log lines skipped", skipped));
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                console.stop().await;
                aborted = true;
                drain(&mut rx, format);
                break;
            }
            _ = settle.tick() => {
                match console.state().await {
                    SimulationState::Blocked => blocked = true,
                    SimulationState::Ready => {
                        drain(&mut rx, format);
                        break;
                    }
                    SimulationState::Attacking => {}
                }
            }
        }
    }

    if format == OutputFormat::Table {
        let state = console.state().await;
        if aborted {
            print_warning(&format!("Attack aborted; console {}", color_state(state)));
        } else if blocked {
            print_success(&format!(
                "{} attack was blocked by the detection engine",
                request.kind.label()
            ));
        } else {
            print_info(&format!("Simulation finished; console {}", color_state(state)));
        }
    }

    Ok(())
}
