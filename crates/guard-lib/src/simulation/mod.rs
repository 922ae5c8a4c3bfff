//! Attack simulation
//!
//! The console state machine, its synthetic log templates and the request
//! bodies sent to the analysis endpoint.

mod console;
pub mod templates;

pub use console::{
    AttackConsole, ConsoleConfig, ConsoleSnapshot, PingReport, StartOutcome,
    MISSING_TARGET_MESSAGE,
};
