//! Real workload primitives
//!
//! Each call performs one bounded unit of CPU, memory or disk work so the
//! worker process shows up with the matching symptom in host-level metrics.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;

use crate::error::{WorkerError, WorkerResult};
use crate::state::WorkerContext;
use crate::traits::Workload;
use crate::types::WorkloadConfig;

/// Light random multiplications per normal iteration
const NORMAL_WORK_STEPS: usize = 100;

/// Characters of filler per scratch-file line
const IO_LINE_WIDTH: usize = 100;

pub struct RealWorkload {
    context: Arc<WorkerContext>,
    config: WorkloadConfig,
}

impl RealWorkload {
    pub fn new(context: Arc<WorkerContext>, config: WorkloadConfig) -> Self {
        Self { context, config }
    }

    /// Scratch file path, unique per worker name
    pub fn scratch_path(&self) -> PathBuf {
        self.config
            .scratch_dir
            .join(format!("worker_{}_io.tmp", self.context.name()))
    }

    fn write_scratch(&self, path: &Path) -> std::io::Result<()> {
        let filler = "x".repeat(IO_LINE_WIDTH);
        let mut writer = BufWriter::new(fs::File::create(path)?);
        for line in 0..self.config.io_lines {
            writeln!(writer, "Line {line}: {filler}")?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl Workload for RealWorkload {
    fn normal(&self) {
        let mut rng = rand::thread_rng();
        let mut acc = 0.0f64;
        for _ in 0..NORMAL_WORK_STEPS {
            acc += rng.gen::<f64>() * rng.gen::<f64>();
        }
        std::hint::black_box(acc);
        std::thread::sleep(self.config.normal_delay);
    }

    fn cpu_spike(&self) -> u64 {
        let mut result = 0u64;
        for i in 0..self.config.cpu_iterations {
            result = result.wrapping_add(i.wrapping_mul(i) % 997);
        }
        std::hint::black_box(result)
    }

    fn memory_leak_step(&self) -> u64 {
        self.context.ballast.grow(self.config.leak_chunk_bytes)
    }

    fn io_churn(&self) -> WorkerResult<()> {
        let path = self.scratch_path();

        let result = self
            .write_scratch(&path)
            .and_then(|_| fs::read(&path))
            .map(|contents| {
                std::hint::black_box(contents.len());
            });

        // Remove the file even when the read failed half-way.
        let cleanup = fs::remove_file(&path);

        result.map_err(|e| WorkerError::scratch(&path, e))?;
        cleanup.map_err(|e| WorkerError::scratch(&path, e))
    }
}
