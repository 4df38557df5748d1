//! Child process stdout/stderr handling
//!
//! - No tracing endpoint: workers inherit the orchestrator's stdout/stderr
//! - Tracing endpoint: workers ship their own logs, output is piped and drained

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use shared::{process_debug, ProcessId};

/// Configure stdio for a worker command based on tracing configuration
pub fn configure_child_stdio(cmd: &mut Command, has_trace_endpoint: bool, worker_name: &str) {
    cmd.stdin(Stdio::null());

    if has_trace_endpoint {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        process_debug!(
            ProcessId::current(),
            "📡 {} will send traces to endpoint (output not forwarded)",
            worker_name
        );
    } else {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        process_debug!(
            ProcessId::current(),
            "🔗 {} output forwarded to orchestrator stdout/stderr",
            worker_name
        );
    }
}

/// Drain piped output so a chatty worker never blocks on a full pipe
pub fn spawn_output_consumers(child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(drain(stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(drain(stderr));
    }
}

async fn drain<R: AsyncRead + Unpin>(stream: R) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(_)) = lines.next_line().await {}
}
