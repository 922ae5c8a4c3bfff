//! Server Guard operator CLI
//!
//! Launches simulated attacks against the detection engine, probes the
//! analysis endpoint and inspects the live security dashboard.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{attack, dashboard, nodes, ping, profile};
use config::Profile;
use guard_lib::{AttackKind, AttackRoute, EndpointConfig, Environment, HttpGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Server Guard operator CLI
#[derive(Parser)]
#[command(name = "sgctl")]
#[command(author, version, about = "Operator CLI for the Server Guard attack console", long_about = None)]
pub struct Cli {
    /// Gateway base URL; required in production
    #[arg(long, env = "GUARD_GATEWAY_URL")]
    pub gateway_url: Option<String>,

    /// Deployment environment (development, production)
    #[arg(long, env = "GUARD_ENVIRONMENT")]
    pub environment: Option<Environment>,

    /// Route for attack requests (analyze, gateway)
    #[arg(long, env = "GUARD_ATTACK_ROUTE")]
    pub route: Option<AttackRoute>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one simulated attack and stream its console log
    Attack {
        /// Attack kind (sql_injection, brute_force, ddos, port_scan)
        kind: AttackKind,

        /// Target URL or IP address
        #[arg(long, short)]
        target: Option<String>,

        /// Number of requests to simulate
        #[arg(long, default_value_t = 100)]
        requests: u32,

        /// Simulated concurrency
        #[arg(long, default_value_t = 10)]
        concurrency: u32,

        /// Seed for reproducible log lines
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Probe the analysis endpoint
    Ping,

    /// Show the security dashboard
    Dashboard {
        /// Keep polling until interrupted
        #[arg(long, short)]
        watch: bool,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
    },

    /// List fleet nodes registered with the gateway
    Nodes,

    /// Manage saved defaults
    #[command(subcommand)]
    Profile(ProfileCommands),
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the saved profile
    Show,

    /// Update saved defaults
    Set {
        #[arg(long)]
        gateway_url: Option<String>,

        #[arg(long)]
        environment: Option<Environment>,

        #[arg(long)]
        route: Option<AttackRoute>,

        /// Default attack target
        #[arg(long)]
        target: Option<String>,
    },
}

impl Cli {
    /// Flags and environment win over the saved profile
    fn endpoint_config(&self, profile: &Profile) -> Result<EndpointConfig> {
        let environment = match (self.environment, &profile.environment) {
            (Some(env), _) => env,
            (None, Some(saved)) => saved
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid environment in profile")?,
            (None, None) => Environment::default(),
        };
        let attack_route = match (self.route, &profile.attack_route) {
            (Some(route), _) => route,
            (None, Some(saved)) => saved
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid attack route in profile")?,
            (None, None) => AttackRoute::default(),
        };

        Ok(EndpointConfig {
            environment,
            gateway_url: self.gateway_url.clone().or_else(|| profile.gateway_url.clone()),
            attack_route,
        })
    }

    fn gateway(&self, profile: &Profile) -> Result<Arc<HttpGateway>> {
        let endpoints = self
            .endpoint_config(profile)?
            .resolve()
            .context("Failed to resolve gateway endpoints")?;
        debug!(
            attack = %endpoints.attack,
            dashboard = %endpoints.dashboard,
            nodes = %endpoints.nodes,
            "Resolved gateway endpoints"
        );
        let gateway = HttpGateway::with_timeout(endpoints, Duration::from_secs(self.timeout_secs))
            .context("Failed to create HTTP client")?;
        Ok(Arc::new(gateway))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let saved = Profile::load()?;

    match &cli.command {
        Commands::Attack {
            kind,
            target,
            requests,
            concurrency,
            seed,
        } => {
            let target = target
                .clone()
                .or_else(|| saved.default_target.clone())
                .unwrap_or_default();
            let request = attack::AttackRequest {
                kind: *kind,
                target,
                request_count: *requests,
                concurrency: *concurrency,
                seed: *seed,
            };
            attack::run_attack(cli.gateway(&saved)?, request, cli.format).await?;
        }
        Commands::Ping => {
            ping::run_ping(cli.gateway(&saved)?, cli.format).await?;
        }
        Commands::Dashboard { watch, interval_ms } => {
            let interval = Duration::from_millis(*interval_ms);
            if *watch {
                dashboard::watch_dashboard(cli.gateway(&saved)?, interval, cli.format).await?;
            } else {
                dashboard::show_dashboard(cli.gateway(&saved)?, cli.format).await?;
            }
        }
        Commands::Nodes => {
            nodes::list_nodes(cli.gateway(&saved)?.as_ref(), cli.format).await?;
        }
        Commands::Profile(ProfileCommands::Show) => {
            profile::show_profile(&saved, cli.format)?;
        }
        Commands::Profile(ProfileCommands::Set {
            gateway_url,
            environment,
            route,
            target,
        }) => {
            let update = profile::ProfileUpdate {
                gateway_url: gateway_url.clone(),
                environment: *environment,
                route: *route,
                target: target.clone(),
            };
            profile::set_profile(saved, update)?;
        }
    }

    Ok(())
}
