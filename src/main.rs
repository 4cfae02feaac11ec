use anyhow::{Context, Result};
use clap::Parser;
use ftserver::config::Config;
use ftserver::constants::EXIT_FAILURE_CODE;
use ftserver::core_cli::Cli;
use ftserver::{core_log, server};
use log::error;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let args = parse_args();

    core_log::logger::init_logger(args.verbose);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(EXIT_FAILURE_CODE);
    }
}

fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let usage = Cli::usage_error(&e);
            eprintln!("{}", usage);
            eprint!("{}", e.render());
            std::process::exit(usage.exit_code());
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate().context("Configuration rejected")?;

    // Run the transfer server
    server::run(config).await
}
