//! Command-line driver for the Chord ring simulator.
//!
//! Provides:
//! - Decoding of textual commands into ring operations
//! - The read/print loop over stdin or a script file
//! - Startup configuration and logging setup

pub mod commands;
pub mod config;
pub mod session;

pub use commands::{Command, CommandError, CommandResult};
pub use config::CliConfig;
pub use session::Session;
