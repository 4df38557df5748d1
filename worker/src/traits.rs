//! Trait definitions with mockall annotations for testing

use crate::error::WorkerResult;

/// One unit of simulated work per call.
///
/// The run loop only decides *which* primitive runs; everything that actually
/// burns CPU, holds memory or touches disk sits behind this trait.
#[mockall::automock]
pub trait Workload: Send + Sync {
    /// Negligible CPU burn followed by a short pause
    fn normal(&self);

    /// One CPU-bound burst; returns the (meaningless) arithmetic result
    fn cpu_spike(&self) -> u64;

    /// Append one buffer to the ballast; returns the ballast size in bytes
    fn memory_leak_step(&self) -> u64;

    /// Write, read back and delete the scratch file
    fn io_churn(&self) -> WorkerResult<()>;
}
