//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use guard_lib::{LogCategory, LogEntry, SimulationState};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Print rows as a table, or the serializable value as JSON
pub fn print_table<T: Tabled, S: Serialize + ?Sized>(rows: Vec<T>, raw: &S, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => print_json(raw),
    }
}

pub fn print_json<S: Serialize + ?Sized>(value: &S) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize output: {}", e)),
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// One console line, colored by category
pub fn format_log_line(entry: &LogEntry) -> String {
    let message = match entry.category {
        LogCategory::Info => entry.message.normal(),
        LogCategory::Success => entry.message.green(),
        LogCategory::Warning => entry.message.yellow(),
        LogCategory::Error => entry.message.red().bold(),
        LogCategory::System => entry.message.cyan(),
    };
    format!("{} {}", format!("[{}]", entry.timestamp).dimmed(), message)
}

pub fn color_state(state: SimulationState) -> String {
    let text = state.to_string();
    match state {
        SimulationState::Ready => text.green().to_string(),
        SimulationState::Attacking => text.yellow().bold().to_string(),
        SimulationState::Blocked => text.red().bold().to_string(),
    }
}

pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "blocked" | "critical" | "unhealthy" | "error" | "failed" => status.red().to_string(),
        "warning" | "degraded" | "high" => status.yellow().to_string(),
        "allowed" | "online" | "healthy" | "active" => status.green().to_string(),
        _ => status.to_string(),
    }
}

/// Confidence as a percentage, colored by strength
pub fn color_confidence(confidence: u8) -> String {
    let formatted = format!("{}%", confidence);
    if confidence >= 80 {
        formatted.red().to_string()
    } else if confidence >= 50 {
        formatted.yellow().to_string()
    } else {
        formatted.normal().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_keeps_message() {
        colored::control::set_override(false);
        let entry = LogEntry {
            timestamp: "12:00:01".to_string(),
            message: "BLOCKED by Web Gatekeeper".to_string(),
            category: LogCategory::Error,
        };
        assert_eq!(format_log_line(&entry), "[12:00:01] BLOCKED by Web Gatekeeper");
    }

    #[test]
    fn test_confidence_formatting() {
        colored::control::set_override(false);
        assert_eq!(color_confidence(97), "97%");
        assert_eq!(color_status("blocked"), "blocked");
    }
}
