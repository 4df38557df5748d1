//! Worker process composition
//!
//! Runs the control server on the tokio runtime and the run loop on its own OS
//! thread, both over one `WorkerContext`. The run loop is CPU-bound and
//! sleeps with `std::thread::sleep`, so it must never share a runtime worker
//! thread with the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use shared::{process_info, signals, ProcessId};

use crate::core::{LoopExit, RunLoop};
use crate::error::{WorkerError, WorkerResult};
use crate::services::{ControlServer, RealWorkload};
use crate::state::WorkerContext;
use crate::types::WorkloadConfig;

/// How a worker process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// The run loop hit the crash flag
    Crashed(LoopExit),
    /// Ctrl+C or SIGTERM
    Signalled(&'static str),
}

impl WorkerExit {
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkerExit::Crashed(exit) => exit.exit_code(),
            WorkerExit::Signalled(_) => 0,
        }
    }
}

pub struct Worker {
    context: Arc<WorkerContext>,
    config: WorkloadConfig,
    startup_delay: Duration,
}

impl Worker {
    pub fn new(name: impl Into<String>, config: WorkloadConfig) -> Self {
        Self {
            context: Arc::new(WorkerContext::new(name)),
            config,
            startup_delay: Duration::from_secs(1),
        }
    }

    /// Pause between binding the server and starting the run loop
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn context(&self) -> &Arc<WorkerContext> {
        &self.context
    }

    /// Serve the control plane on `port` and run the workload loop until a
    /// crash is injected or the process is signalled.
    pub async fn run(self, port: u16) -> WorkerResult<WorkerExit> {
        let server = ControlServer::bind(port, self.context.clone()).await?;
        let mut server_task = tokio::spawn(server.serve());

        tokio::time::sleep(self.startup_delay).await;

        let (exit_tx, exit_rx) = oneshot::channel();
        let run_loop = RunLoop::new(
            self.context.clone(),
            RealWorkload::new(self.context.clone(), self.config.clone()),
            &self.config,
        );
        std::thread::Builder::new()
            .name(format!("{}-run-loop", self.context.name()))
            .spawn(move || {
                let _ = exit_tx.send(run_loop.run());
            })?;

        tokio::select! {
            exit = exit_rx => {
                let exit = exit.map_err(|_| WorkerError::config("run loop thread ended without an exit reason"))?;
                Ok(WorkerExit::Crashed(exit))
            }
            served = &mut server_task => {
                match served {
                    Ok(result) => result.map(|_| WorkerExit::Signalled("control server stopped")),
                    Err(e) => Err(WorkerError::config(format!("control server task failed: {e}"))),
                }
            }
            reason = signals::wait_for_shutdown_signal() => {
                process_info!(ProcessId::current(), "👋 [{}] Shutting down gracefully...", self.context.name());
                Ok(WorkerExit::Signalled(reason))
            }
        }
    }
}
