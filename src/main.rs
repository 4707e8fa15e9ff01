use clap::Parser;
use tracing_subscriber::EnvFilter;

mod binning;
mod cli;
mod core;
mod output;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("bin_by_sam=debug,info")
    } else {
        EnvFilter::new("bin_by_sam=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Bin(args) => {
            cli::bin::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Refs(args) => {
            cli::refs::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
