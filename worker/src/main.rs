//! Worker binary entry point
//!
//! Started by the orchestrator's process manager with `--name` and `--port`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use shared::{logging, process_error, ProcessId};
use worker::{Worker, WorkerExit, WorkerResult, WorkloadConfig};

/// Fleet worker that simulates workloads and accepts failure injection
#[derive(Parser, Debug)]
#[command(name = "worker")]
#[command(about = "Worker process for per-process monitoring demos")]
struct Args {
    /// Worker name (e.g. worker1)
    #[arg(long)]
    name: String,

    /// HTTP port for health checks and failure injection
    #[arg(long)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Tracing endpoint URL
    #[arg(long)]
    trace_ep: Option<String>,

    /// Pause after each normal iteration, in milliseconds
    #[arg(long, default_value_t = 100)]
    normal_delay_ms: u64,

    /// Arithmetic steps per CPU-spike burst
    #[arg(long, default_value_t = 1_000_000)]
    cpu_iterations: u64,

    /// CPU-spike bursts per loop iteration
    #[arg(long, default_value_t = 10)]
    cpu_bursts: u32,

    /// Ballast added per memory-leak step, in MiB
    #[arg(long, default_value_t = 10)]
    leak_chunk_mb: usize,

    /// Pause after each memory-leak step, in milliseconds
    #[arg(long, default_value_t = 500)]
    leak_pause_ms: u64,

    /// Lines written per I/O-churn unit
    #[arg(long, default_value_t = 1000)]
    io_lines: usize,

    /// Directory for the I/O scratch file (defaults to the system temp dir)
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Pause between starting the control server and the workload loop, in milliseconds
    #[arg(long, default_value_t = 1000)]
    startup_delay_ms: u64,
}

impl Args {
    fn workload_config(&self) -> WorkloadConfig {
        let config = WorkloadConfig::default()
            .with_normal_delay(Duration::from_millis(self.normal_delay_ms))
            .with_cpu_iterations(self.cpu_iterations)
            .with_cpu_spike_bursts(self.cpu_bursts)
            .with_leak_chunk_mb(self.leak_chunk_mb)
            .with_leak_pause(Duration::from_millis(self.leak_pause_ms))
            .with_io_lines(self.io_lines);

        match &self.scratch_dir {
            Some(dir) => config.with_scratch_dir(dir),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> WorkerResult<()> {
    let args = Args::parse();

    ProcessId::init_worker(&args.name);

    let trace_endpoint = args
        .trace_ep
        .as_ref()
        .map(|url| logging::TracingEndpoint::new(url.clone()));
    let has_trace_endpoint = trace_endpoint.is_some();
    logging::init_tracing_with_endpoint_and_level(trace_endpoint, Some(&args.log_level));

    logging::log_startup(
        ProcessId::current(),
        &format!("worker {} on port {} (PID {})", args.name, args.port, std::process::id()),
    );

    let worker = Worker::new(args.name.clone(), args.workload_config())
        .with_startup_delay(Duration::from_millis(args.startup_delay_ms));

    let exit = match worker.run(args.port).await {
        Ok(exit) => exit,
        Err(e) => {
            logging::log_error(ProcessId::current(), "Worker", &e);
            return Err(e);
        }
    };

    match exit {
        WorkerExit::Crashed(loop_exit) => {
            process_error!(ProcessId::current(), "💥 [{}] Terminating after {:?}", args.name, loop_exit);
            if has_trace_endpoint {
                logging::flush_traces();
            }
            std::process::exit(loop_exit.exit_code());
        }
        WorkerExit::Signalled(reason) => {
            logging::log_shutdown(ProcessId::current(), reason);
            if has_trace_endpoint {
                logging::flush_traces();
            }
            Ok(())
        }
    }
}
