//! Main orchestrator implementation
//!
//! Owns the fleet: spawns workers through the process manager, talks to
//! their control planes through the worker client, drives the operator
//! command loop and tears everything down exactly once.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use shared::{
    logging, process_debug, process_info, process_warn, ClearResponse, FailureKind, InjectResponse, ProcessId,
    WorkerSpec,
};

use crate::core::{commands, report, Command, ShutdownTrigger};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{ProcessManager, WorkerClient};
use crate::types::{HealthClass, OrchestratorConfig, StopSummary, WorkerHealth, WorkerInfo, WorkerProcessStatus};

/// Failure kinds walked through by the scripted demo, one per worker
const DEMO_SCENARIOS: [(FailureKind, &str); 3] = [
    (FailureKind::CpuSpike, "CPU Spike"),
    (FailureKind::MemoryLeak, "Memory Leak"),
    (FailureKind::IoHeavy, "I/O Heavy Load"),
];

/// Whether the command loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Main orchestrator that supervises the worker fleet
pub struct Orchestrator<C, P>
where
    C: WorkerClient + 'static,
    P: ProcessManager + 'static,
{
    /// Injected services
    client: C,
    process_manager: Arc<P>,

    config: OrchestratorConfig,

    /// Workers that were spawned successfully, in spawn order
    fleet: Vec<WorkerInfo>,

    shutdown: ShutdownTrigger,

    /// Background liveness check, stopped before teardown
    liveness: std::sync::Mutex<Option<JoinHandle<()>>>,

    /// Result of the one teardown
    stopped: Mutex<Option<StopSummary>>,
}

impl<C, P> Orchestrator<C, P>
where
    C: WorkerClient + 'static,
    P: ProcessManager + 'static,
{
    /// Create new orchestrator with injected dependencies
    pub fn new(client: C, process_manager: P, config: OrchestratorConfig) -> Self {
        Self {
            client,
            process_manager: Arc::new(process_manager),
            config,
            fleet: Vec::new(),
            shutdown: ShutdownTrigger::new(),
            liveness: std::sync::Mutex::new(None),
            stopped: Mutex::new(None),
        }
    }

    /// Handle for signal handlers and tests
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.shutdown.clone()
    }

    pub fn fleet(&self) -> &[WorkerInfo] {
        &self.fleet
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Spawn one worker per spec, staggered, then wait for warmup
    ///
    /// A worker that fails to spawn is logged and skipped. Fails when the
    /// specs are inconsistent or no worker could be started.
    pub async fn start_all(&mut self, specs: &[WorkerSpec]) -> OrchestratorResult<&[WorkerInfo]> {
        validate_specs(specs)?;
        process_info!(ProcessId::current(), "🚀 Starting {} worker processes...", specs.len());

        for (index, spec) in specs.iter().enumerate() {
            if self.shutdown.is_triggered() {
                break;
            }
            if index > 0 && !self.pause(self.config.stagger).await {
                break;
            }

            process_info!(ProcessId::current(), "Starting {} on port {}...", spec.name, spec.port);
            match self.process_manager.spawn_worker(spec).await {
                Ok(info) => self.fleet.push(info),
                Err(e) => logging::log_error(ProcessId::current(), "Worker spawn", &e),
            }
        }

        if self.fleet.is_empty() {
            return Err(OrchestratorError::spawn("fleet", "no worker process could be started"));
        }

        logging::log_success(
            ProcessId::current(),
            &format!("All {} workers started", self.fleet.len()),
        );
        process_info!(ProcessId::current(), "⏳ Waiting for workers to be ready...");
        self.pause(self.config.warmup).await;

        Ok(&self.fleet)
    }

    /// Poll every worker's `/health`; never fails
    pub async fn check_health(&self) -> Vec<WorkerHealth> {
        let mut entries = Vec::with_capacity(self.fleet.len());

        for worker in &self.fleet {
            let entry = match self.client.health(worker).await {
                Ok(report) => WorkerHealth {
                    name: worker.name.clone(),
                    port: worker.port,
                    pid: Some(report.pid),
                    class: HealthClass::from_flags(&report.failures),
                    failures: Some(report.failures),
                },
                Err(e) => WorkerHealth {
                    name: worker.name.clone(),
                    port: worker.port,
                    pid: None,
                    class: classify_error(e),
                    failures: None,
                },
            };
            process_debug!(ProcessId::current(), "🩺 {} is {}", entry.name, entry.class);
            entries.push(entry);
        }

        entries
    }

    /// Inject `kind` into the named worker
    pub async fn inject_failure(&self, name: &str, kind: FailureKind) -> OrchestratorResult<InjectResponse> {
        let worker = self.resolve(name)?;
        self.client.inject_failure(worker, kind).await
    }

    /// Clear every failure flag on the named worker
    pub async fn clear_failures(&self, name: &str) -> OrchestratorResult<ClearResponse> {
        let worker = self.resolve(name)?;
        self.client.clear_failures(worker).await
    }

    pub async fn process_status(&self) -> Vec<WorkerProcessStatus> {
        self.process_manager.process_status().await
    }

    /// Start the periodic liveness check; a second call is a no-op
    pub fn spawn_liveness_monitor(&self) {
        let mut slot = self.liveness.lock().unwrap_or_else(|p| p.into_inner());
        if slot.is_some() {
            return;
        }

        let process_manager = self.process_manager.clone();
        let shutdown = self.shutdown.clone();
        let period = self.config.liveness_interval;

        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = ticker.tick() => {
                        for exited in process_manager.reap_exited().await {
                            let how = match exited.code {
                                Some(code) => format!("exit status {code}"),
                                None => "killed by signal".to_string(),
                            };
                            process_warn!(
                                ProcessId::current(),
                                "⚠ WARNING: {} (PID {}) has stopped ({})",
                                exited.name,
                                exited.pid,
                                how
                            );
                        }
                    }
                }
            }
        }));
    }

    /// Interactive command loop
    ///
    /// Reads lines from `input` until `quit`, end of input or the shutdown
    /// trigger, then tears the fleet down.
    pub async fn run<R>(&self, input: R) -> OrchestratorResult<StopSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        self.spawn_liveness_monitor();
        say(&report::header("PROCESS MONITORING DEMO - INTERACTIVE MODE"));
        say(&commands::usage());

        let mut lines = input.lines();
        loop {
            prompt();
            let line = tokio::select! {
                _ = self.shutdown.wait() => {
                    say("\nReceived shutdown signal...");
                    break;
                }
                line = lines.next_line() => line,
            };

            match line {
                Ok(Some(line)) => match Command::parse(&line) {
                    None => continue,
                    Some(Ok(command)) => {
                        if self.execute(command).await == Flow::Quit {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        say(&format!("✗ {e}"));
                        say(&commands::usage());
                    }
                },
                Ok(None) => {
                    say("\nEOF detected, exiting...");
                    break;
                }
                Err(e) => {
                    logging::log_error(ProcessId::current(), "Reading operator input", &e);
                    break;
                }
            }
        }

        Ok(self.stop_all().await)
    }

    /// Execute one parsed command and print its outcome
    pub async fn execute(&self, command: Command) -> Flow {
        match command {
            Command::Health => say(&report::health_table(&self.check_health().await)),
            Command::Status => say(&report::status_table(&self.process_status().await)),
            Command::Inject { worker, kind } => match self.inject_failure(&worker, kind).await {
                Ok(_) => say(&format!("✓ Successfully injected '{kind}' into {worker}")),
                Err(e) => say(&describe_failure("inject failure", &e)),
            },
            Command::Clear { worker } => match self.clear_failures(&worker).await {
                Ok(_) => say(&format!("✓ Cleared all failures from {worker}")),
                Err(e) => say(&describe_failure("clear failures", &e)),
            },
            Command::Help => say(&commands::usage()),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Scripted walkthrough: one failure kind per worker with health checks
    /// in between, then teardown
    pub async fn run_demo(&self) -> StopSummary {
        self.spawn_liveness_monitor();
        say(&report::header("Demo Application Ready"));
        say(&report::health_table(&self.check_health().await));

        for (number, (worker, (kind, title))) in self.fleet.iter().zip(DEMO_SCENARIOS).enumerate() {
            if self.shutdown.is_triggered() {
                break;
            }
            say(&report::header(&format!("Scenario {}: {} in {}", number + 1, title, worker.name)));
            match self.client.inject_failure(worker, kind).await {
                Ok(_) => say(&format!("✓ Injected '{kind}' into {}", worker.name)),
                Err(e) => say(&format!("✗ Error: {e}")),
            }
            if !self.pause(self.config.demo_step).await {
                break;
            }
            say(&report::health_table(&self.check_health().await));
        }

        if !self.shutdown.is_triggered() {
            say(&report::header("Demo Complete"));
            say("All failure scenarios demonstrated!");
        }

        self.stop_all().await
    }

    /// Stop the liveness check, then terminate every worker
    ///
    /// Runs once; later or concurrent calls wait for the first and return
    /// its summary.
    pub async fn stop_all(&self) -> StopSummary {
        let mut stopped = self.stopped.lock().await;
        if let Some(summary) = *stopped {
            return summary;
        }

        self.shutdown.trigger();
        let liveness = self.liveness.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = liveness {
            handle.abort();
            let _ = handle.await;
        }

        say("\nStopping worker processes...");
        let summary = self.process_manager.stop_all(self.config.grace_period).await;
        say(&report::stop_summary(&summary));

        *stopped = Some(summary);
        summary
    }

    fn resolve(&self, name: &str) -> OrchestratorResult<&WorkerInfo> {
        self.fleet
            .iter()
            .find(|worker| worker.name == name)
            .ok_or_else(|| OrchestratorError::unknown_worker(name))
    }

    /// Sleep unless shutdown fires first; false when interrupted
    async fn pause(&self, duration: std::time::Duration) -> bool {
        if duration.is_zero() {
            return !self.shutdown.is_triggered();
        }
        tokio::select! {
            _ = self.shutdown.wait() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

/// Reject empty fleets and duplicate names or ports
pub fn validate_specs(specs: &[WorkerSpec]) -> OrchestratorResult<()> {
    if specs.is_empty() {
        return Err(OrchestratorError::config("at least one worker is required"));
    }
    for (index, spec) in specs.iter().enumerate() {
        for earlier in &specs[..index] {
            if earlier.name == spec.name {
                return Err(OrchestratorError::config(format!("duplicate worker name '{}'", spec.name)));
            }
            if earlier.port == spec.port {
                return Err(OrchestratorError::config(format!(
                    "port {} is used by both {} and {}",
                    spec.port, earlier.name, spec.name
                )));
            }
        }
    }
    Ok(())
}

fn classify_error(error: OrchestratorError) -> HealthClass {
    match error {
        OrchestratorError::WorkerRejected { status, .. } => HealthClass::Error(status),
        OrchestratorError::WorkerUnreachable { reason, .. } | OrchestratorError::InvalidResponse { reason, .. } => {
            HealthClass::Unresponsive(reason)
        }
        other => HealthClass::Unresponsive(other.to_string()),
    }
}

fn describe_failure(action: &str, error: &OrchestratorError) -> String {
    match error {
        OrchestratorError::UnknownWorker { name } => format!("Error: Worker '{name}' not found!"),
        OrchestratorError::WorkerRejected { status, .. } => format!("✗ Failed to {action}: HTTP {status}"),
        other => format!("✗ Error communicating with worker: {other}"),
    }
}

fn say(text: &str) {
    println!("{text}");
}

fn prompt() {
    print!("\nCommand> ");
    let _ = std::io::stdout().flush();
}
