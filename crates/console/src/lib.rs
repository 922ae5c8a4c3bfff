//! Server Guard console daemon
//!
//! Hosts the attack simulation console and the dashboard poller behind a
//! small HTTP API, alongside health and Prometheus endpoints.

pub mod api;
pub mod config;
