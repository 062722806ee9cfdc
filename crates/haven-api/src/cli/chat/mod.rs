//! Interactive terminal chat.
//!
//! - `commands`: slash command parsing and help
//! - `loop_runner`: the read/stream/print loop

pub mod commands;
pub mod loop_runner;
