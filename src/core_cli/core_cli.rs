use crate::config::Config;
use crate::core_error::ServerError;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "ftserver",
    version,
    about = "Serves directory listings and files over a separate data connection."
)]
pub struct Cli {
    /// Port to listen on for control connections
    pub port: u16,

    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to serve instead of the working directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line values win over the configuration file.
    pub fn apply_to(&self, config: &mut Config) {
        config.server.listen_port = self.port;
        if let Some(root) = &self.root {
            config.server.root_dir = root.clone();
        }
    }

    /// Wraps a rejected command line so it is reported and exits like
    /// every other process-level failure.
    pub fn usage_error(err: &clap::Error) -> ServerError {
        ServerError::UsageError(err.kind().to_string())
    }
}
