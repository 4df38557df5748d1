//! Operator input
//!
//! Lines are read on a plain OS thread and forwarded into an in-memory pipe.
//! A terminal read stuck in the kernel then never holds up runtime shutdown.

use std::io::BufRead;

use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
use tokio::runtime::Handle;

use shared::{logging, ProcessId};

use crate::error::OrchestratorResult;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Forward lines from `source` into an async reader
///
/// The thread stops at end of input or on a read error, and once the
/// returned reader has been dropped. Must be called inside a tokio runtime.
pub fn spawn_line_reader<R>(source: R) -> OrchestratorResult<BufReader<DuplexStream>>
where
    R: BufRead + Send + 'static,
{
    let handle = Handle::try_current().map_err(std::io::Error::other)?;
    let (reader, mut writer) = tokio::io::duplex(PIPE_CAPACITY);

    std::thread::Builder::new()
        .name("operator-input".to_string())
        .spawn(move || {
            for line in source.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        logging::log_error(ProcessId::current(), "Reading operator input", &e);
                        break;
                    }
                };
                let forwarded = handle.block_on(async {
                    writer.write_all(line.as_bytes()).await?;
                    writer.write_all(b"\n").await
                });
                if forwarded.is_err() {
                    // Reader is gone
                    break;
                }
            }
        })?;

    Ok(BufReader::new(reader))
}

/// Operator input from the terminal
pub fn stdin_lines() -> OrchestratorResult<BufReader<DuplexStream>> {
    spawn_line_reader(std::io::BufReader::new(std::io::stdin()))
}
