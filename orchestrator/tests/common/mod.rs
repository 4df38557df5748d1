//! Common test utilities and infrastructure
//!
//! Shared fixtures, mock builders and fake worker servers used across the
//! orchestrator test suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{FakeWorker, OrchestratorBuilder, TestHelpers};
