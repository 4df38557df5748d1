//! Service implementations
//!
//! Real implementations of the worker's service traits and the HTTP control
//! server.

pub mod control_server;
pub mod workload;

pub use control_server::ControlServer;
pub use workload::RealWorkload;
