//! Startup configuration.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

/// Chord ring maintenance simulator.
#[derive(Parser, Debug, Clone)]
#[command(name = "chord", version, about)]
pub struct CliConfig {
    /// Ring exponent m; node ids live in [0, 2^m).
    #[arg(value_parser = clap::value_parser!(u32).range(1..=63))]
    pub bits: u32,

    /// Read commands from this file instead of stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set. Logs go to stderr.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl CliConfig {
    pub fn run(&self) -> anyhow::Result<()> {
        init_tracing(&self.log_level);

        let mut session = Session::new(self.bits).context("invalid ring exponent")?;
        let stdout = io::stdout().lock();
        match &self.input {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                session.run(BufReader::new(file), stdout)?;
            }
            None => session.run(io::stdin().lock(), stdout)?,
        }
        Ok(())
    }
}

/// Respects `RUST_LOG` if set, otherwise uses `level`.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let config = CliConfig::try_parse_from(["chord", "5", "--input", "cmds.txt"]).unwrap();
        assert_eq!(config.bits, 5);
        assert_eq!(config.input, Some(PathBuf::from("cmds.txt")));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_rejects_bad_exponent() {
        assert!(CliConfig::try_parse_from(["chord", "0"]).is_err());
        assert!(CliConfig::try_parse_from(["chord", "64"]).is_err());
        assert!(CliConfig::try_parse_from(["chord"]).is_err());
    }
}
