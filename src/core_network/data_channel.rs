use crate::core_error::SessionError;
use log::{debug, info};
use std::net::SocketAddr;
use tokio::net::{lookup_host, TcpStream};

/// Parses the port token sent by the client for the data connection.
pub fn parse_port(port: &str) -> Result<u16, SessionError> {
    port.parse::<u16>()
        .map_err(|e| SessionError::MalformedMessage(format!("invalid data port {:?}: {}", port, e)))
}

/// Opens the outbound data connection to `host:port`.
/// Resolves the host name first, then tries each address in turn.
pub async fn setup_data_connection(host: &str, port: u16) -> Result<TcpStream, SessionError> {
    let connect_failure = |reason: String| SessionError::DataConnectFailure {
        host: host.to_string(),
        port,
        reason,
    };

    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| connect_failure(format!("name resolution failed: {}", e)))?
        .collect();
    if addrs.is_empty() {
        return Err(connect_failure("host resolved to no addresses".to_string()));
    }

    let mut last_error = None;
    for addr in addrs {
        debug!("Trying data connection to {}", addr);
        match TcpStream::connect(addr).await {
            Ok(data_stream) => {
                info!("Data connection established with {}", addr);
                return Ok(data_stream);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(connect_failure(
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no address accepted the connection".to_string()),
    ))
}
