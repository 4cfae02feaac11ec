use crate::constants::{
    CLIENT_FRAGMENT_SIZE, CLIENT_MAX_PAYLOAD_SIZE, DEFAULT_LISTEN_ADDRESS, GET_CMD, LIST_CMD,
};
use crate::core_error::ClientError;
use crate::core_protocol::{receive_message, send_message, FrameLimits};
use log::{debug, info};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List { data_port: u16 },
    Get { filename: String, data_port: u16 },
}

impl Request {
    /// The command sent on the control connection.
    pub fn command_message(&self) -> String {
        match self {
            Request::List { .. } => LIST_CMD.to_string(),
            Request::Get { filename, .. } => format!("{} {}", GET_CMD, filename),
        }
    }

    /// The reply that means the server accepted the command.
    pub fn expected_ack(&self) -> &'static str {
        match self {
            Request::List { .. } => LIST_CMD,
            Request::Get { .. } => GET_CMD,
        }
    }

    /// Port 0 lets the operating system pick one.
    pub fn data_port(&self) -> u16 {
        match self {
            Request::List { data_port } | Request::Get { data_port, .. } => *data_port,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub server_host: String,
    pub server_port: u16,
    /// Host name sent to the server for the data connection.
    pub data_host: String,
    /// Local address the data listener binds to.
    pub data_bind_address: String,
    pub download_dir: PathBuf,
    pub limits: FrameLimits,
}

impl ClientOptions {
    pub fn new(server_host: &str, server_port: u16, data_host: &str) -> Self {
        Self {
            server_host: server_host.to_string(),
            server_port,
            data_host: data_host.to_string(),
            data_bind_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            download_dir: PathBuf::from("."),
            limits: FrameLimits {
                max_message_size: CLIENT_MAX_PAYLOAD_SIZE,
                fragment_size: CLIENT_FRAGMENT_SIZE,
            },
        }
    }
}

/// What a finished request produced.
#[derive(Debug)]
pub enum Transfer {
    Listing(Vec<u8>),
    Saved { path: PathBuf, bytes: usize },
}

/// Runs one request against the server.
///
/// The data listener is bound before its address is sent, so the server
/// can connect back as soon as it reads the address.
pub async fn run_request(options: &ClientOptions, request: &Request) -> Result<Transfer, ClientError> {
    if let Request::Get { filename, .. } = request {
        let destination = destination_path(&options.download_dir, filename)?;
        if destination.exists() {
            return Err(ClientError::FileExists(destination));
        }
    }

    let mut control = TcpStream::connect((options.server_host.as_str(), options.server_port))
        .await
        .map_err(|source| ClientError::Connect {
            host: options.server_host.clone(),
            port: options.server_port,
            source,
        })?;

    send_message(&mut control, request.command_message().as_bytes()).await?;
    let reply = receive_message(&mut control, options.limits)
        .await?
        .into_complete()?;
    let reply = String::from_utf8_lossy(&reply).into_owned();
    if reply != request.expected_ack() {
        return Err(ClientError::Rejected(reply));
    }

    let data_listener =
        TcpListener::bind((options.data_bind_address.as_str(), request.data_port())).await?;
    let data_port = data_listener.local_addr()?.port();
    send_message(
        &mut control,
        format!("{} {}", options.data_host, data_port).as_bytes(),
    )
    .await?;
    debug!("Waiting for the data connection on port {}", data_port);

    // The server closes the control connection without connecting back
    // when it cannot reach the data address.
    let (mut data_stream, peer) = tokio::select! {
        biased;
        accepted = data_listener.accept() => accepted?,
        _ = receive_message(&mut control, options.limits) => {
            return Err(ClientError::NoDataConnection);
        }
    };

    match request {
        Request::List { .. } => info!("Receiving directory structure from {}", peer),
        Request::Get { filename, .. } => info!("Receiving \"{}\" from {}", filename, peer),
    }
    let payload = receive_message(&mut data_stream, options.limits)
        .await?
        .into_complete()?;

    if let Err(e) = control.shutdown().await {
        debug!("Closing control connection: {}", e);
    }

    match request {
        Request::List { .. } => Ok(Transfer::Listing(payload)),
        Request::Get { filename, .. } => {
            let path = save_file(&options.download_dir, filename, &payload).await?;
            Ok(Transfer::Saved {
                path,
                bytes: payload.len(),
            })
        }
    }
}

/// Where a requested file lands: its final path component inside `dir`.
pub fn destination_path(dir: &Path, filename: &str) -> Result<PathBuf, ClientError> {
    Path::new(filename)
        .file_name()
        .map(|name| dir.join(name))
        .ok_or_else(|| ClientError::InvalidRequest(format!("{:?} is not a file name", filename)))
}

/// Writes a received file without ever replacing an existing one.
pub async fn save_file(dir: &Path, filename: &str, contents: &[u8]) -> Result<PathBuf, ClientError> {
    let path = destination_path(dir, filename)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ClientError::FileExists(path.clone()),
            _ => ClientError::Io(e),
        })?;
    file.write_all(contents).await?;
    file.flush().await?;
    Ok(path)
}
