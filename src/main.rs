use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod design;
mod external;
mod filtering;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("fish_probes=debug,info")
    } else {
        EnvFilter::new("fish_probes=info")
    };

    // Logs go to stderr so json and tsv output stay parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Hcr(args) => {
            cli::hcr::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Padlock(args) => {
            cli::padlock::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
