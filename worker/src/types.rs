//! Worker configuration types

use std::path::PathBuf;
use std::time::Duration;

const MIB: usize = 1024 * 1024;

/// Tuning for the workload primitives and the run loop
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    /// Pause after each normal iteration
    pub normal_delay: Duration,
    /// Arithmetic steps in one CPU-spike burst
    pub cpu_iterations: u64,
    /// Bursts per CPU-spike loop iteration
    pub cpu_spike_bursts: u32,
    /// Size of one ballast buffer
    pub leak_chunk_bytes: usize,
    /// Pause after each memory-leak step
    pub leak_pause: Duration,
    /// Lines written per I/O-churn unit
    pub io_lines: usize,
    /// Directory holding the per-worker scratch file
    pub scratch_dir: PathBuf,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            normal_delay: Duration::from_millis(100),
            cpu_iterations: 1_000_000,
            cpu_spike_bursts: 10,
            leak_chunk_bytes: 10 * MIB,
            leak_pause: Duration::from_millis(500),
            io_lines: 1000,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl WorkloadConfig {
    pub fn with_normal_delay(mut self, delay: Duration) -> Self {
        self.normal_delay = delay;
        self
    }

    pub fn with_cpu_iterations(mut self, iterations: u64) -> Self {
        self.cpu_iterations = iterations;
        self
    }

    pub fn with_cpu_spike_bursts(mut self, bursts: u32) -> Self {
        self.cpu_spike_bursts = bursts;
        self
    }

    pub fn with_leak_chunk_mb(mut self, megabytes: usize) -> Self {
        self.leak_chunk_bytes = megabytes.saturating_mul(MIB);
        self
    }

    pub fn with_leak_chunk_bytes(mut self, bytes: usize) -> Self {
        self.leak_chunk_bytes = bytes;
        self
    }

    pub fn with_leak_pause(mut self, pause: Duration) -> Self {
        self.leak_pause = pause;
        self
    }

    pub fn with_io_lines(mut self, lines: usize) -> Self {
        self.io_lines = lines;
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }
}
