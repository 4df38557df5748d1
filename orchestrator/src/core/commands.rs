//! Operator command parsing

use std::str::FromStr;

use shared::FailureKind;

use crate::error::{OrchestratorError, OrchestratorResult};

/// One line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Health,
    Status,
    Inject { worker: String, kind: FailureKind },
    Clear { worker: String },
    Help,
    Quit,
}

impl Command {
    /// Parse one input line
    ///
    /// Blank lines yield `None`. Anything that is not a well-formed command
    /// yields `InvalidCommand`, except a well-formed `inject` with an
    /// unrecognized failure type, which yields the shared parse error.
    pub fn parse(line: &str) -> Option<OrchestratorResult<Command>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let (&verb, args) = words.split_first()?;

        let command = match (verb, args) {
            ("health", []) => Ok(Command::Health),
            ("status", []) => Ok(Command::Status),
            ("help", []) => Ok(Command::Help),
            ("quit", []) => Ok(Command::Quit),
            ("inject", [worker, kind]) => FailureKind::from_str(kind)
                .map(|kind| Command::Inject {
                    worker: worker.to_string(),
                    kind,
                })
                .map_err(OrchestratorError::from),
            ("clear", [worker]) => Ok(Command::Clear {
                worker: worker.to_string(),
            }),
            _ => Err(OrchestratorError::InvalidCommand {
                input: line.trim().to_string(),
            }),
        };

        Some(command)
    }
}

/// Usage text printed by `help` and after invalid input
pub fn usage() -> String {
    let kinds = FailureKind::ALL.map(|k| k.as_str()).join(", ");
    format!(
        "Available commands:\n\
         \x20 health                  - Check health of all workers\n\
         \x20 status                  - Show worker process liveness\n\
         \x20 inject <worker> <type>  - Inject failure into worker\n\
         \x20                           Types: {kinds}\n\
         \x20 clear <worker>          - Clear all failures from worker\n\
         \x20 help                    - Show this help\n\
         \x20 quit                    - Stop all workers and exit"
    )
}
