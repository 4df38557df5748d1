//! Real service implementations behind the orchestrator traits

pub mod process_manager;
pub mod process_output_handler;
pub mod worker_client;

pub use process_manager::RealProcessManager;
pub use worker_client::RealWorkerClient;
