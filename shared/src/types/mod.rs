//! Core types used throughout the worker fleet

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::SharedError;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Label used before any `init_*` call (unit tests, library consumers)
static UNASSIGNED: ProcessId = ProcessId::Unassigned;

/// Process identifier used to label log output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Orchestrator process (singleton)
    Orchestrator,
    /// Worker process, labelled by its fleet name
    Worker(String),
    /// No identity assigned yet
    Unassigned,
}

impl ProcessId {
    /// Initialize the global process ID for orchestrator
    pub fn init_orchestrator() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Orchestrator)
    }

    /// Initialize the global process ID for a worker with its fleet name
    pub fn init_worker(name: &str) -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Worker(name.to_string()))
    }

    /// Get the global process ID, or `Unassigned` if none was set
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&UNASSIGNED)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Orchestrator => write!(f, "orchestrator"),
            ProcessId::Worker(name) => write!(f, "{name}"),
            ProcessId::Unassigned => write!(f, "unassigned"),
        }
    }
}

/// One injectable misbehavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    CpuSpike,
    MemoryLeak,
    Crash,
    IoHeavy,
}

impl FailureKind {
    /// Every failure kind, in wire order
    pub const ALL: [FailureKind; 4] = [
        FailureKind::CpuSpike,
        FailureKind::MemoryLeak,
        FailureKind::Crash,
        FailureKind::IoHeavy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::CpuSpike => "cpu_spike",
            FailureKind::MemoryLeak => "memory_leak",
            FailureKind::Crash => "crash",
            FailureKind::IoHeavy => "io_heavy",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FailureKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SharedError::UnknownFailureKind { input: s.to_string() })
    }
}

/// Point-in-time copy of a worker's failure flags, as sent over the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureFlags {
    pub cpu_spike: bool,
    pub memory_leak: bool,
    pub crash: bool,
    pub io_heavy: bool,
}

impl FailureFlags {
    pub fn get(&self, kind: FailureKind) -> bool {
        match kind {
            FailureKind::CpuSpike => self.cpu_spike,
            FailureKind::MemoryLeak => self.memory_leak,
            FailureKind::Crash => self.crash,
            FailureKind::IoHeavy => self.io_heavy,
        }
    }

    pub fn with(mut self, kind: FailureKind) -> Self {
        match kind {
            FailureKind::CpuSpike => self.cpu_spike = true,
            FailureKind::MemoryLeak => self.memory_leak = true,
            FailureKind::Crash => self.crash = true,
            FailureKind::IoHeavy => self.io_heavy = true,
        }
        self
    }

    /// Active failure kinds in wire order
    pub fn active(&self) -> Vec<FailureKind> {
        FailureKind::ALL.into_iter().filter(|kind| self.get(*kind)).collect()
    }

    pub fn any(&self) -> bool {
        FailureKind::ALL.into_iter().any(|kind| self.get(kind))
    }
}

/// Launch parameters of one worker: unique fleet name and listening port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerSpec {
    pub name: String,
    pub port: u16,
}

impl WorkerSpec {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self { name: name.into(), port }
    }

    /// The three-worker fleet used when nothing else is configured
    pub fn default_fleet() -> Vec<WorkerSpec> {
        vec![
            WorkerSpec::new("worker1", 8001),
            WorkerSpec::new("worker2", 8002),
            WorkerSpec::new("worker3", 8003),
        ]
    }
}

impl fmt::Display for WorkerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.port)
    }
}

/// Parses `name:port`, e.g. `worker1:8001`
impl FromStr for WorkerSpec {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SharedError::InvalidWorkerSpec {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (name, port) = s.rsplit_once(':').ok_or_else(|| invalid("expected name:port"))?;
        let name = name.trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(invalid("name must be non-empty and contain no whitespace"));
        }
        let port: u16 = port.trim().parse().map_err(|_| invalid("port must be a number 1-65535"))?;
        if port == 0 {
            return Err(invalid("port must be a number 1-65535"));
        }

        Ok(WorkerSpec::new(name, port))
    }
}
