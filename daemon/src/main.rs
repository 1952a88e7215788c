//! Verdict daemon: entry point for running a verdict node.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use verdict_node::{
    spawn_reconcile_loop, LogNotifier, NodeConfig, ShutdownController, StorageBackend, VerdictNode,
};
use verdict_rpc::RpcServer;
use verdict_types::EventId;
use verdict_utils::LogFormat;

#[derive(Parser)]
#[command(name = "verdict-daemon", about = "Verdict poll and tally node")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and environment variables override them.
    #[arg(long, env = "VERDICT_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Default)]
struct Overrides {
    /// Data directory for LMDB storage.
    #[arg(long, env = "VERDICT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend: "lmdb" or "memory".
    #[arg(long, env = "VERDICT_STORAGE")]
    storage: Option<StorageBackend>,

    /// Serve the HTTP API.
    #[arg(long, env = "VERDICT_ENABLE_RPC")]
    rpc: Option<bool>,

    #[arg(long, env = "VERDICT_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Seconds between reconciliation sweeps; 0 disables them.
    #[arg(long, env = "VERDICT_RECONCILE_INTERVAL")]
    reconcile_interval: Option<u64>,

    /// Expose Prometheus metrics at `/metrics`.
    #[arg(long, env = "VERDICT_ENABLE_METRICS")]
    metrics: Option<bool>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VERDICT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VERDICT_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut NodeConfig) {
        if let Some(v) = self.data_dir {
            config.data_dir = v;
        }
        if let Some(v) = self.storage {
            config.storage = v;
        }
        if let Some(v) = self.rpc {
            config.enable_rpc = v;
        }
        if let Some(v) = self.rpc_port {
            config.rpc_port = v;
        }
        if let Some(v) = self.reconcile_interval {
            config.reconcile_interval_secs = v;
        }
        if let Some(v) = self.metrics {
            config.enable_metrics = v;
        }
        if let Some(v) = self.log_format {
            config.log_format = v;
        }
        if let Some(v) = self.log_level {
            config.log_level = v;
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the node with its scheduler and HTTP API until interrupted.
    Run,
    /// Run one reconciliation sweep and print the report.
    Reconcile {
        /// Only this event.
        #[arg(long)]
        event: Option<String>,
    },
    /// Verify every commitment of an event. Exits with status 2 on a mismatch.
    Verify {
        #[arg(long)]
        event: String,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&PathBuf>, overrides: Overrides) -> anyhow::Result<NodeConfig> {
    let mut config = match path {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    let node = Arc::new(VerdictNode::open(config.clone(), Arc::new(LogNotifier)).context("opening node")?);
    let shutdown = ShutdownController::new();

    tracing::info!(
        storage = ?config.storage,
        rpc = if config.enable_rpc { config.rpc_port.to_string() } else { "off".into() },
        reconcile_secs = config.reconcile_interval_secs,
        "starting verdict node"
    );

    let scheduler = (config.reconcile_interval_secs > 0).then(|| {
        spawn_reconcile_loop(
            Arc::clone(&node),
            Duration::from_secs(config.reconcile_interval_secs),
            shutdown.subscribe(),
        )
    });

    let server = config.enable_rpc.then(|| {
        let server = RpcServer::new(Arc::clone(&node), config.rpc_port);
        let rx = shutdown.subscribe();
        tokio::spawn(async move { server.serve(rx).await })
    });

    shutdown.wait_for_signal().await;

    if let Some(handle) = server {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "rpc server failed"),
            Err(e) => tracing::error!(error = %e, "rpc server task panicked"),
        }
    }
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }
    tracing::info!("verdict node stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.overrides)?;
    verdict_utils::init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Run => {
            run(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Reconcile { event } => {
            let node = VerdictNode::open(config, Arc::new(LogNotifier))?;
            let event = event.map(EventId::new);
            let report = node.reconcile_statuses(event.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.failures.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Verify { event } => {
            let node = VerdictNode::open(config, Arc::new(LogNotifier))?;
            let report = node.verify_all(&EventId::new(event))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
