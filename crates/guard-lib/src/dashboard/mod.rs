//! Telemetry dashboard
//!
//! Polls the dashboard snapshot, normalizes raw log records into display
//! entries and derives alerts, counters and a telemetry window from them.

pub mod events;
pub mod normalize;
mod poller;
mod view;

pub use events::GatewayEvent;
pub use poller::{DashboardPoller, DashboardPollerBuilder, DEFAULT_POLL_INTERVAL};
pub use view::{DashboardSummary, DashboardView, LOG_CAPACITY, TELEMETRY_CAPACITY};
