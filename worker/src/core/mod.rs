//! Core worker logic

pub mod run_loop;

pub use run_loop::{Behavior, LoopExit, RunLoop};
