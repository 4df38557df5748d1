//! Console rendering for operator output

use crate::types::{HealthClass, StopSummary, WorkerHealth, WorkerProcessStatus};

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Title framed by rules
pub fn header(title: &str) -> String {
    format!("{}\n{}\n{}", rule(), title, rule())
}

/// Health table, one line per worker plus a detail line for active failures
pub fn health_table(entries: &[WorkerHealth]) -> String {
    let mut lines = vec![header("WORKER HEALTH STATUS")];

    for entry in entries {
        match &entry.class {
            HealthClass::Healthy => {
                lines.push(format!("{:10} [✓ HEALTHY     ] PID: {}", entry.name, pid_label(entry.pid)));
            }
            HealthClass::Degraded(kinds) => {
                lines.push(format!("{:10} [⚠ DEGRADED    ] PID: {}", entry.name, pid_label(entry.pid)));
                let active: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
                lines.push(format!("{:10} └─ Active failures: {}", "", active.join(", ")));
            }
            HealthClass::Unresponsive(reason) => {
                lines.push(format!("{:10} [✗ NO RESPONSE ] {}", entry.name, truncate(reason, 40)));
            }
            HealthClass::Error(status) => {
                lines.push(format!("{:10} [✗ ERROR       ] HTTP {}", entry.name, status));
            }
        }
    }

    lines.push(rule());
    lines.join("\n")
}

/// Process liveness table for the `status` command
pub fn status_table(entries: &[WorkerProcessStatus]) -> String {
    let mut lines = vec![header("WORKER PROCESSES")];
    if entries.is_empty() {
        lines.push("no workers spawned".to_string());
    }
    for entry in entries {
        lines.push(format!("{:10} PID: {:<8} {}", entry.name, entry.pid, entry.state));
    }
    lines.push(rule());
    lines.join("\n")
}

pub fn stop_summary(summary: &StopSummary) -> String {
    format!(
        "All workers stopped ({} terminated, {} killed, {} already exited).",
        summary.terminated, summary.killed, summary.already_exited
    )
}

fn pid_label(pid: Option<u32>) -> String {
    pid.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
