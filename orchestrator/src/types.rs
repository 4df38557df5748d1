//! Orchestrator data types and configuration

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use shared::{FailureFlags, FailureKind};

/// Addressing record for one spawned worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerInfo {
    pub name: String,
    pub port: u16,
    pub pid: u32,
}

/// Orchestrator-side classification of one health poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthClass {
    /// Responded, no failure flag active
    Healthy,
    /// Responded with at least one active failure flag
    Degraded(Vec<FailureKind>),
    /// Request failed or timed out
    Unresponsive(String),
    /// Responded with a non-success status code
    Error(u16),
}

impl HealthClass {
    pub fn from_flags(flags: &FailureFlags) -> Self {
        if flags.any() {
            HealthClass::Degraded(flags.active())
        } else {
            HealthClass::Healthy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthClass::Healthy => "HEALTHY",
            HealthClass::Degraded(_) => "DEGRADED",
            HealthClass::Unresponsive(_) => "UNRESPONSIVE",
            HealthClass::Error(_) => "ERROR",
        }
    }
}

impl fmt::Display for HealthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Health of one worker as seen by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerHealth {
    pub name: String,
    pub port: u16,
    /// PID reported by the worker itself, when it answered
    pub pid: Option<u32>,
    pub class: HealthClass,
    pub failures: Option<FailureFlags>,
}

/// Liveness of one child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited { code: Option<i32> },
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Running => write!(f, "running"),
            ProcessState::Exited { code: Some(code) } => write!(f, "exited with status {code}"),
            ProcessState::Exited { code: None } => write!(f, "killed by signal"),
        }
    }
}

/// Liveness snapshot for the `status` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProcessStatus {
    pub name: String,
    pub pid: u32,
    pub state: ProcessState,
}

/// A child that exited without being asked to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitedWorker {
    pub name: String,
    pub pid: u32,
    pub code: Option<i32>,
}

/// Outcome of tearing the fleet down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopSummary {
    /// Exited within the grace period after SIGTERM
    pub terminated: usize,
    /// Still alive after the grace period and killed
    pub killed: usize,
    /// Already gone before shutdown began
    pub already_exited: usize,
}

impl StopSummary {
    pub fn total(&self) -> usize {
        self.terminated + self.killed + self.already_exited
    }
}

/// How worker processes are launched
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnConfig {
    pub worker_bin: PathBuf,
    pub log_level: String,
    pub trace_endpoint: Option<String>,
    /// Extra arguments appended to every worker command line
    pub extra_args: Vec<String>,
}

impl SpawnConfig {
    pub fn new(worker_bin: impl Into<PathBuf>) -> Self {
        Self {
            worker_bin: worker_bin.into(),
            log_level: "info".to_string(),
            trace_endpoint: None,
            extra_args: Vec::new(),
        }
    }

    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    pub fn with_trace_endpoint(mut self, trace_endpoint: Option<String>) -> Self {
        self.trace_endpoint = trace_endpoint;
        self
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// `worker` next to the running executable
    pub fn default_worker_bin() -> PathBuf {
        let file_name = format!("worker{}", std::env::consts::EXE_SUFFIX);
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
            .unwrap_or_else(|| PathBuf::from(file_name))
    }
}

/// How the worker client reaches control servers
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub host: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            timeout: Duration::from_secs(2),
        }
    }
}

impl ClientConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fleet timing
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Pause between consecutive spawns
    pub stagger: Duration,
    /// Wait after the last spawn before the fleet counts as ready
    pub warmup: Duration,
    /// How long stopped workers get after SIGTERM before SIGKILL
    pub grace_period: Duration,
    /// Period of the liveness check
    pub liveness_interval: Duration,
    /// Pause after each scripted demo injection
    pub demo_step: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            stagger: Duration::from_millis(500),
            warmup: Duration::from_secs(3),
            grace_period: Duration::from_secs(2),
            liveness_interval: Duration::from_secs(5),
            demo_step: Duration::from_secs(2),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_liveness_interval(mut self, interval: Duration) -> Self {
        self.liveness_interval = interval;
        self
    }

    pub fn with_demo_step(mut self, step: Duration) -> Self {
        self.demo_step = step;
        self
    }

    /// Zero delays everywhere; for tests
    pub fn immediate() -> Self {
        Self {
            stagger: Duration::ZERO,
            warmup: Duration::ZERO,
            grace_period: Duration::from_millis(200),
            liveness_interval: Duration::from_millis(50),
            demo_step: Duration::ZERO,
        }
    }
}
