use crate::config::Config;
use crate::core_network::network;
use crate::helpers::log_config;
use anyhow::Result;
use std::sync::Arc;

/// Runs the file-transfer server with the provided configuration.
///
/// Binds the listening socket, logs the effective configuration and hands
/// the listener to the dispatcher, which keeps accepting until the process
/// is terminated.
///
/// # Arguments
///
/// * `config` - The validated server configuration.
///
/// # Returns
///
/// Result<(), anyhow::Error> when the listening socket cannot be set up.
pub async fn run(config: Config) -> Result<()> {
    log_config(&config);

    let listener = network::bind_listener(&config).await?;
    network::start_server(listener, Arc::new(config)).await;

    Ok(())
}
