// Command-line client for the transfer server
pub mod cli;
pub mod client;

pub use cli::ClientCli;
pub use client::{run_request, save_file, ClientOptions, Request, Transfer};
