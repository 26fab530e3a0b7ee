use clap::Parser;
use tracing_subscriber::EnvFilter;

mod assembly;
mod cli;
mod core;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("assembly_planner=debug,info")
    } else {
        EnvFilter::new("assembly_planner=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Plan(args) => {
            cli::plan::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Graph(args) => {
            cli::graph::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
