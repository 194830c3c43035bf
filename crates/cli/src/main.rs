//! CLI entry point for the Chord ring simulator.

use chord_cli::CliConfig;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    config.run()
}
