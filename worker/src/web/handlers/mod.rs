//! Request handlers

pub mod control;
