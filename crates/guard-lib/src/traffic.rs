//! Synthetic traffic profiles
//!
//! Pure generators for the flow statistics and host metrics attached to
//! simulated attacks. Output depends only on the mode and the RNG passed
//! in, so a seeded RNG reproduces the same request bodies.

use crate::models::{NetworkStats, ServerMetrics};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    Normal,
    /// High rate, SYN flood, tiny inter-arrival time
    Ddos,
    /// High rate but few SYNs (legitimate spike)
    HeavyLoad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMode {
    Normal,
    Busy,
    Crash,
}

pub fn network_stats<R: Rng + ?Sized>(mode: NetworkMode, rng: &mut R) -> NetworkStats {
    match mode {
        NetworkMode::Ddos => NetworkStats {
            rate: rng.gen_range(8000.0..50000.0),
            syn_count: rng.gen_range(100..=300),
            iat: rng.gen_range(0.001..0.05),
            total_size: rng.gen_range(64.0..128.0),
        },
        NetworkMode::HeavyLoad => NetworkStats {
            rate: rng.gen_range(2000.0..4500.0),
            syn_count: rng.gen_range(5..=20),
            iat: rng.gen_range(0.1..0.5),
            total_size: rng.gen_range(500.0..1500.0),
        },
        NetworkMode::Normal => NetworkStats {
            rate: rng.gen_range(10.0..800.0),
            syn_count: rng.gen_range(0..=4),
            iat: rng.gen_range(1.0..5.0),
            total_size: rng.gen_range(200.0..1200.0),
        },
    }
}

pub fn server_metrics<R: Rng + ?Sized>(mode: ServerMode, rng: &mut R) -> ServerMetrics {
    let (cpu, ram) = match mode {
        ServerMode::Crash => (96..=100, 90..=100),
        ServerMode::Busy => (50..=80, 40..=60),
        ServerMode::Normal => (5..=30, 20..=40),
    };

    ServerMetrics {
        cpu_usage: rng.gen_range(cpu),
        ram_usage: rng.gen_range(ram),
    }
}
