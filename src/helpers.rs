use crate::config::Config;
use log::{info, warn};

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Root Directory: {:?}", config.server.root_dir);
    info!(
        "  Max Message Size: {} KB",
        config.server.max_message_size / 1024
    );
    info!("  Fragment Size: {} bytes", config.server.fragment_size);

    if !config.server.root_dir.is_dir() {
        warn!(
            "Root directory {:?} is not a readable directory; LIST requests will fail",
            config.server.root_dir
        );
    }
}
