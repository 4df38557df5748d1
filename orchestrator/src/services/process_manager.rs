//! Real process management service implementation
//!
//! Spawns worker binaries as child processes, reaps unexpected exits and
//! tears the fleet down with SIGTERM followed by SIGKILL after a grace period.

use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::Instant;

use shared::{process_debug, process_info, process_warn, ProcessId, WorkerSpec};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::services::process_output_handler::{configure_child_stdio, spawn_output_consumers};
use crate::traits::ProcessManager;
use crate::types::{ExitedWorker, ProcessState, SpawnConfig, StopSummary, WorkerInfo, WorkerProcessStatus};

/// Real process manager implementation
pub struct RealProcessManager {
    /// Every worker spawned so far, in spawn order
    workers: Mutex<Vec<WorkerDescriptor>>,

    config: SpawnConfig,
}

/// One owned child process
struct WorkerDescriptor {
    name: String,
    pid: u32,
    child: Child,
    /// Set once the child has been observed to exit
    exit: Option<Option<i32>>,
    /// Whether the exit has been handed out by `reap_exited`
    reported: bool,
}

impl WorkerDescriptor {
    /// Poll the child without blocking; returns true while it runs
    fn refresh(&mut self) -> bool {
        if self.exit.is_some() {
            return false;
        }
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                self.exit = Some(exit_code(status));
                false
            }
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Cannot poll {} (PID {}): {}", self.name, self.pid, e);
                true
            }
        }
    }

    fn state(&self) -> ProcessState {
        match self.exit {
            None => ProcessState::Running,
            Some(code) => ProcessState::Exited { code },
        }
    }

    /// Ask the child to terminate
    fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            match kill(Pid::from_raw(self.pid as i32), Signal::SIGTERM) {
                Ok(()) => return,
                Err(e) => {
                    process_debug!(ProcessId::current(), "SIGTERM to {} failed ({}), killing", self.name, e);
                }
            }
        }

        if let Err(e) = self.child.start_kill() {
            process_debug!(ProcessId::current(), "Kill of {} failed: {}", self.name, e);
        }
    }

    /// SIGKILL and reap
    async fn kill_now(&mut self) {
        if let Err(e) = self.child.kill().await {
            process_warn!(ProcessId::current(), "⚠️ Kill of {} failed: {}", self.name, e);
        }
        self.exit = Some(self.child.try_wait().ok().flatten().and_then(exit_code));
    }
}

fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}

impl RealProcessManager {
    pub fn new(config: SpawnConfig) -> Self {
        Self {
            workers: Mutex::new(Vec::new()),
            config,
        }
    }

    /// Configure tracing endpoint (fluent API)
    pub fn with_trace_endpoint(mut self, trace_endpoint: Option<String>) -> Self {
        self.config.trace_endpoint = trace_endpoint;
        self
    }

    /// Configure log level (fluent API)
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.config.log_level = log_level.into();
        self
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    fn build_command(&self, spec: &WorkerSpec) -> Command {
        let mut cmd = Command::new(&self.config.worker_bin);
        cmd.arg("--name")
            .arg(&spec.name)
            .arg("--port")
            .arg(spec.port.to_string())
            .arg("--log-level")
            .arg(&self.config.log_level);

        if let Some(ref trace_ep) = self.config.trace_endpoint {
            cmd.arg("--trace-ep").arg(trace_ep);
        }
        cmd.args(&self.config.extra_args);

        configure_child_stdio(&mut cmd, self.config.trace_endpoint.is_some(), &spec.name);
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ProcessManager for RealProcessManager {
    async fn spawn_worker(&self, spec: &WorkerSpec) -> OrchestratorResult<WorkerInfo> {
        let mut workers = self.workers.lock().await;
        if workers.iter_mut().any(|w| w.name == spec.name && w.refresh()) {
            return Err(OrchestratorError::spawn(&spec.name, "a worker with this name is already running"));
        }

        let mut child = self
            .build_command(spec)
            .spawn()
            .map_err(|e| OrchestratorError::spawn(&spec.name, format!("{}: {e}", self.config.worker_bin.display())))?;

        let pid = child
            .id()
            .ok_or_else(|| OrchestratorError::spawn(&spec.name, "child exited before its PID was read"))?;

        if self.config.trace_endpoint.is_some() {
            spawn_output_consumers(&mut child);
        }

        process_debug!(ProcessId::current(), "🏭 Spawned {} (PID: {}) on port {}", spec.name, pid, spec.port);

        workers.push(WorkerDescriptor {
            name: spec.name.clone(),
            pid,
            child,
            exit: None,
            reported: false,
        });

        Ok(WorkerInfo {
            name: spec.name.clone(),
            port: spec.port,
            pid,
        })
    }

    async fn reap_exited(&self) -> Vec<ExitedWorker> {
        let mut workers = self.workers.lock().await;
        let mut exited = Vec::new();

        for worker in workers.iter_mut() {
            worker.refresh();
            if let (Some(code), false) = (worker.exit, worker.reported) {
                worker.reported = true;
                exited.push(ExitedWorker {
                    name: worker.name.clone(),
                    pid: worker.pid,
                    code,
                });
            }
        }

        exited
    }

    async fn process_status(&self) -> Vec<WorkerProcessStatus> {
        let mut workers = self.workers.lock().await;
        workers
            .iter_mut()
            .map(|worker| {
                worker.refresh();
                WorkerProcessStatus {
                    name: worker.name.clone(),
                    pid: worker.pid,
                    state: worker.state(),
                }
            })
            .collect()
    }

    async fn stop_all(&self, grace: Duration) -> StopSummary {
        let mut workers = self.workers.lock().await;
        let mut summary = StopSummary::default();

        for worker in workers.iter_mut() {
            if worker.refresh() {
                worker.terminate();
            } else {
                summary.already_exited += 1;
            }
        }

        let deadline = Instant::now() + grace;
        for worker in workers.iter_mut().filter(|w| w.exit.is_none()) {
            let outcome = tokio::time::timeout_at(deadline, worker.child.wait()).await;
            match outcome {
                Ok(Ok(status)) => {
                    worker.exit = Some(exit_code(status));
                    summary.terminated += 1;
                    process_debug!(ProcessId::current(), "🛑 Stopped {} (PID {})", worker.name, worker.pid);
                }
                Ok(Err(e)) => {
                    process_warn!(ProcessId::current(), "⚠️ Waiting on {} failed: {}", worker.name, e);
                    worker.kill_now().await;
                    summary.killed += 1;
                }
                Err(_) => {
                    process_warn!(
                        ProcessId::current(),
                        "⚠️ {} (PID {}) still running after {:?}, killing",
                        worker.name,
                        worker.pid,
                        grace
                    );
                    worker.kill_now().await;
                    summary.killed += 1;
                }
            }
        }

        for worker in workers.iter_mut() {
            worker.reported = true;
        }

        process_info!(
            ProcessId::current(),
            "🛑 Fleet stopped: {} terminated, {} killed, {} already exited",
            summary.terminated,
            summary.killed,
            summary.already_exited
        );
        summary
    }
}
