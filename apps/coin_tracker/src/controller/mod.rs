//! Controller layer: command parsing and orchestration against the tracker.

pub mod commands;
pub mod orchestration;
