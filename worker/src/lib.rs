//! Worker library for the fault-injection fleet
//!
//! A worker serves a small HTTP control plane and runs a workload loop whose
//! behavior (normal, CPU spike, memory leak, I/O churn, crash) is switched at
//! runtime through that control plane.

pub mod core;
pub mod error;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;
pub mod web;
pub mod worker_impl;

// Re-export main types
pub use core::{Behavior, LoopExit, RunLoop};
pub use error::{WorkerError, WorkerResult};
pub use services::{ControlServer, RealWorkload};
pub use state::{FailureState, MemoryBallast, WorkerContext};
pub use traits::Workload;
pub use types::WorkloadConfig;
pub use worker_impl::{Worker, WorkerExit};
