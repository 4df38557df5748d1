//! Worker state shared between the control server and the run loop
//!
//! One `WorkerContext` is built at startup and handed (behind an `Arc`) to both
//! activities. Failure flags are independent atomics: a request may flip a flag
//! while the run loop is between reads, and the loop simply sees the new value
//! on its next iteration. There is no ordering guarantee across flags.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use shared::{FailureFlags, FailureKind};

/// Byte written into every ballast buffer so its pages are actually committed
const BALLAST_FILL: u8 = 0xA5;

/// Which failure modes are active for one worker
#[derive(Debug, Default)]
pub struct FailureState {
    cpu_spike: AtomicBool,
    memory_leak: AtomicBool,
    crash: AtomicBool,
    io_heavy: AtomicBool,
}

impl FailureState {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, kind: FailureKind) -> &AtomicBool {
        match kind {
            FailureKind::CpuSpike => &self.cpu_spike,
            FailureKind::MemoryLeak => &self.memory_leak,
            FailureKind::Crash => &self.crash,
            FailureKind::IoHeavy => &self.io_heavy,
        }
    }

    pub fn set(&self, kind: FailureKind) {
        self.flag(kind).store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self, kind: FailureKind) -> bool {
        self.flag(kind).load(Ordering::Relaxed)
    }

    pub fn clear_all(&self) {
        for kind in FailureKind::ALL {
            self.flag(kind).store(false, Ordering::Relaxed);
        }
    }

    /// Copy of all four flags; each flag is read independently
    pub fn snapshot(&self) -> FailureFlags {
        FailureFlags {
            cpu_spike: self.is_set(FailureKind::CpuSpike),
            memory_leak: self.is_set(FailureKind::MemoryLeak),
            crash: self.is_set(FailureKind::Crash),
            io_heavy: self.is_set(FailureKind::IoHeavy),
        }
    }
}

/// Memory the worker deliberately refuses to release
#[derive(Debug, Default)]
pub struct MemoryBallast {
    chunks: Mutex<Vec<Vec<u8>>>,
}

impl MemoryBallast {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the list half-updated,
    // so a poisoned guard is still usable.
    fn chunks(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        self.chunks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append one buffer of `bytes` bytes; returns the new total size
    pub fn grow(&self, bytes: usize) -> u64 {
        let chunk = vec![BALLAST_FILL; bytes];
        let mut chunks = self.chunks();
        chunks.push(chunk);
        Self::total(&chunks)
    }

    /// Drop every buffer; returns the number of bytes released
    pub fn release(&self) -> u64 {
        let released = std::mem::take(&mut *self.chunks());
        Self::total(&released)
    }

    pub fn size_bytes(&self) -> u64 {
        Self::total(&self.chunks())
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks().len()
    }

    fn total(chunks: &[Vec<u8>]) -> u64 {
        chunks.iter().map(|chunk| chunk.len() as u64).sum()
    }
}

/// Everything one worker process shares between its two activities
#[derive(Debug)]
pub struct WorkerContext {
    name: String,
    pid: u32,
    pub failures: FailureState,
    pub ballast: MemoryBallast,
    iterations: AtomicU64,
}

impl WorkerContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_pid(name, std::process::id())
    }

    pub fn with_pid(name: impl Into<String>, pid: u32) -> Self {
        Self {
            name: name.into(),
            pid,
            failures: FailureState::new(),
            ballast: MemoryBallast::new(),
            iterations: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Reset all flags and free the ballast; returns bytes released
    pub fn clear_failures(&self) -> u64 {
        self.failures.clear_all();
        self.ballast.release()
    }

    /// Bump the run-loop counter; returns the new iteration number
    pub fn next_iteration(&self) -> u64 {
        self.iterations.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }
}
