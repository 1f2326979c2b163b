mod cli;

use anyhow::Context;
use clap::Parser;

pub const PROGRAM_NAME: &str = "grammar-registry";

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    cli.run().context("Running CLI")?;
    Ok(())
}
