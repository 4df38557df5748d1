//! Main entry point for the orchestrator binary

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use orchestrator::core::input;
use orchestrator::{
    ClientConfig, Orchestrator, OrchestratorConfig, OrchestratorResult, RealProcessManager, RealWorkerClient,
    SpawnConfig,
};
use shared::{logging, process_debug, signals, ProcessId, WorkerSpec};

/// Supervises a fleet of fault-injection workers
#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "Spawns worker processes, injects failures on command and monitors their health")]
pub struct Args {
    /// Worker to spawn as name:port (repeatable)
    #[arg(long = "worker", env = "FLEET_WORKERS", value_delimiter = ',', default_values_t = WorkerSpec::default_fleet())]
    pub workers: Vec<WorkerSpec>,

    /// Path to the worker binary (defaults to `worker` next to this executable)
    #[arg(long, env = "FLEET_WORKER_BIN")]
    pub worker_bin: Option<PathBuf>,

    /// Host the worker control servers are reached on
    #[arg(long, env = "FLEET_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (trace, debug, info, warn, error), also passed to workers
    #[arg(long, env = "FLEET_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Tracing endpoint URL (if set, all spawned workers will also trace here)
    #[arg(long, env = "FLEET_TRACE_EP")]
    pub trace_ep: Option<String>,

    /// Timeout for each control-plane request
    #[arg(long, env = "FLEET_REQUEST_TIMEOUT_MS", default_value = "2000")]
    pub request_timeout_ms: u64,

    /// Pause between worker spawns
    #[arg(long, env = "FLEET_STAGGER_MS", default_value = "500")]
    pub stagger_ms: u64,

    /// Wait after the last spawn before the first health check
    #[arg(long, env = "FLEET_WARMUP_MS", default_value = "3000")]
    pub warmup_ms: u64,

    /// Grace period between SIGTERM and SIGKILL at shutdown
    #[arg(long, env = "FLEET_GRACE_MS", default_value = "2000")]
    pub grace_ms: u64,

    /// Period of the worker liveness check
    #[arg(long, env = "FLEET_LIVENESS_MS", default_value = "5000")]
    pub liveness_ms: u64,

    /// Run the scripted walkthrough instead of the interactive loop
    #[arg(long, env = "FLEET_DEMO")]
    pub demo: bool,

    /// Pause after each demo injection
    #[arg(long, env = "FLEET_DEMO_STEP_MS", default_value = "2000")]
    pub demo_step_ms: u64,
}

impl Args {
    fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_stagger(Duration::from_millis(self.stagger_ms))
            .with_warmup(Duration::from_millis(self.warmup_ms))
            .with_grace_period(Duration::from_millis(self.grace_ms))
            .with_liveness_interval(Duration::from_millis(self.liveness_ms.max(1)))
            .with_demo_step(Duration::from_millis(self.demo_step_ms))
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_host(self.host.clone())
            .with_timeout(Duration::from_millis(self.request_timeout_ms))
    }

    fn spawn_config(&self) -> SpawnConfig {
        let worker_bin = self.worker_bin.clone().unwrap_or_else(SpawnConfig::default_worker_bin);
        SpawnConfig::new(worker_bin)
            .with_log_level(self.log_level.clone())
            .with_trace_endpoint(self.trace_ep.clone())
    }
}

#[tokio::main]
async fn main() -> OrchestratorResult<()> {
    // A missing .env file is fine
    let _ = dotenv::dotenv();
    let args = Args::parse();

    // Initialize process ID singleton for orchestrator
    ProcessId::init_orchestrator();

    let trace_endpoint = args
        .trace_ep
        .as_ref()
        .map(|url| logging::TracingEndpoint::new(url.clone()));
    logging::init_tracing_with_endpoint_and_level(trace_endpoint, Some(&args.log_level));

    logging::log_startup(
        ProcessId::current(),
        &format!("orchestrator ({})", if args.demo { "demo mode" } else { "interactive mode" }),
    );

    let spawn_config = args.spawn_config();
    process_debug!(ProcessId::current(), "Worker binary: {}", spawn_config.worker_bin.display());

    let client = RealWorkerClient::new(args.client_config())?;
    let process_manager = RealProcessManager::new(spawn_config);
    let mut orchestrator = Orchestrator::new(client, process_manager, args.orchestrator_config());

    // Set up graceful shutdown
    let shutdown = orchestrator.shutdown_trigger();
    tokio::spawn(async move {
        let reason = signals::wait_for_shutdown_signal().await;
        logging::log_shutdown(ProcessId::current(), reason);
        shutdown.trigger();
    });

    if let Err(e) = orchestrator.start_all(&args.workers).await {
        logging::log_error(ProcessId::current(), "Fleet startup", &e);
        orchestrator.stop_all().await;
        return Err(e);
    }

    let outcome = if args.demo {
        Ok(orchestrator.run_demo().await)
    } else {
        orchestrator.run(input::stdin_lines()?).await
    };

    // No-op when the loop already tore the fleet down
    orchestrator.stop_all().await;
    outcome?;

    if args.trace_ep.is_some() {
        logging::flush_traces();
    }
    logging::log_success(ProcessId::current(), "Orchestrator stopped gracefully");
    Ok(())
}
