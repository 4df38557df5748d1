//! Worker run loop
//!
//! Every iteration re-reads the failure flags and runs exactly one behavior,
//! chosen by fixed priority: crash, cpu spike, memory leak, io heavy, normal.
//! Nothing inside a workload unit is interruptible; a flag change takes effect
//! at the next iteration boundary.

use std::sync::Arc;
use std::time::Duration;

use shared::{process_error, process_info, process_warn, FailureFlags, ProcessId};

use crate::state::WorkerContext;
use crate::traits::Workload;
use crate::types::WorkloadConfig;

/// Normal iterations between progress log lines
const NORMAL_LOG_EVERY: u64 = 10;

/// What a single iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Crash,
    CpuSpike,
    MemoryLeak,
    IoHeavy,
    Normal,
}

impl Behavior {
    /// Pick the highest-priority active behavior
    pub fn select(flags: &FailureFlags) -> Behavior {
        if flags.crash {
            Behavior::Crash
        } else if flags.cpu_spike {
            Behavior::CpuSpike
        } else if flags.memory_leak {
            Behavior::MemoryLeak
        } else if flags.io_heavy {
            Behavior::IoHeavy
        } else {
            Behavior::Normal
        }
    }
}

/// Why the loop stopped; the only way out is an injected crash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    CrashInjected { iteration: u64 },
}

impl LoopExit {
    /// Process exit status the worker must terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            LoopExit::CrashInjected { .. } => 1,
        }
    }
}

pub struct RunLoop<W: Workload> {
    context: Arc<WorkerContext>,
    workload: W,
    cpu_spike_bursts: u32,
    leak_pause: Duration,
}

impl<W: Workload> RunLoop<W> {
    pub fn new(context: Arc<WorkerContext>, workload: W, config: &WorkloadConfig) -> Self {
        Self {
            context,
            workload,
            cpu_spike_bursts: config.cpu_spike_bursts,
            leak_pause: config.leak_pause,
        }
    }

    /// Run iterations until a crash is injected
    pub fn run(&self) -> LoopExit {
        process_info!(
            ProcessId::current(),
            "⚙️  Worker {} started with PID {}",
            self.context.name(),
            self.context.pid()
        );

        loop {
            let iteration = self.context.next_iteration();
            if self.step(iteration) == Behavior::Crash {
                return LoopExit::CrashInjected { iteration };
            }
        }
    }

    /// Run one iteration and report which behavior ran
    pub fn step(&self, iteration: u64) -> Behavior {
        let behavior = Behavior::select(&self.context.failures.snapshot());
        let name = self.context.name();

        match behavior {
            Behavior::Crash => {
                process_error!(ProcessId::current(), "💥 [{}] CRASH FAILURE INJECTED - exiting", name);
            }
            Behavior::CpuSpike => {
                process_info!(ProcessId::current(), "🔥 [{}] CPU spike active (iteration {})", name, iteration);
                for _ in 0..self.cpu_spike_bursts {
                    self.workload.cpu_spike();
                }
            }
            Behavior::MemoryLeak => {
                let held = self.workload.memory_leak_step();
                process_info!(
                    ProcessId::current(),
                    "🧠 [{}] Memory leak active (iteration {}, ballast {} MiB)",
                    name,
                    iteration,
                    held / (1024 * 1024)
                );
                std::thread::sleep(self.leak_pause);
            }
            Behavior::IoHeavy => {
                process_info!(ProcessId::current(), "💾 [{}] I/O heavy load active (iteration {})", name, iteration);
                if let Err(e) = self.workload.io_churn() {
                    process_warn!(ProcessId::current(), "⚠️ [{}] I/O error: {}", name, e);
                }
            }
            Behavior::Normal => {
                if iteration % NORMAL_LOG_EVERY == 0 {
                    process_info!(ProcessId::current(), "[{}] Normal operation (iteration {})", name, iteration);
                }
                self.workload.normal();
            }
        }

        behavior
    }
}
