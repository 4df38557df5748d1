//! Core orchestrator logic with no process or network I/O

pub mod commands;
pub mod input;
pub mod report;
pub mod shutdown;

pub use commands::Command;
pub use shutdown::ShutdownTrigger;
