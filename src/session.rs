use crate::constants::UNKNOWN_COMMAND;
use crate::core_error::SessionError;
use crate::core_ftpcommand::{get, list, FtpCommand};
use crate::core_network::data_channel::{parse_port, setup_data_connection};
use crate::core_protocol::framer::contains_terminator;
use crate::core_protocol::{receive_message, send_message, CommandArgs, FrameLimits};
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCommand,
    Acknowledged,
    AwaitingDataAddress,
    DataConnected,
    Complete,
    Aborted,
}

/// Per-session settings copied out of the server configuration at spawn.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub root_dir: PathBuf,
    pub limits: FrameLimits,
}

/// One client's control connection and everything negotiated on it.
///
/// A session is moved into its own task and never shared.
#[derive(Debug)]
pub struct Session {
    control_stream: TcpStream,
    data_stream: Option<TcpStream>,
    command: FtpCommand,
    filename: Option<String>,
    requested_file: Option<File>,
    peer: SocketAddr,
    state: SessionState,
    settings: SessionSettings,
}

impl Session {
    pub fn new(control_stream: TcpStream, peer: SocketAddr, settings: SessionSettings) -> Self {
        Self {
            control_stream,
            data_stream: None,
            command: FtpCommand::UNKNOWN,
            filename: None,
            requested_file: None,
            peer,
            state: SessionState::AwaitingCommand,
            settings,
        }
    }

    /// Drives the session to `Complete` or `Aborted`, then closes both
    /// connections whatever the outcome.
    pub async fn run(mut self) -> Result<SessionState, SessionError> {
        let outcome = self.drive().await;
        self.close().await;

        match outcome {
            Ok(()) => {
                self.transition(SessionState::Complete);
                Ok(self.state)
            }
            Err(e) => {
                self.transition(SessionState::Aborted);
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        let request = self.receive_control().await?;
        self.command = FtpCommand::from_message(&request);

        let token = match self.command.token() {
            Some(token) => token,
            None => {
                info!("Received an unknown command from {}", self.peer);
                self.send_control(UNKNOWN_COMMAND).await?;
                return Ok(());
            }
        };

        if self.command == FtpCommand::GET {
            self.prepare_get(&request).await?;
        }

        self.send_control(token).await?;
        self.transition(SessionState::Acknowledged);

        self.transition(SessionState::AwaitingDataAddress);
        let address = self.receive_control().await?;
        let args = CommandArgs::split(&address)?;
        let (host, port) = args.pair()?;
        let port = parse_port(port)?;

        match &self.filename {
            Some(filename) => info!(
                "Connection from {}. File \"{}\" requested on port {}",
                host, filename, port
            ),
            None => info!(
                "Connection from {}. List directory requested on port {}",
                host, port
            ),
        }

        self.data_stream = Some(setup_data_connection(host, port).await?);
        self.transition(SessionState::DataConnected);

        let payload = self.produce_payload().await?;
        if contains_terminator(&payload) {
            warn!(
                "Payload for {} contains the end-of-message marker; the client will see it truncated",
                self.peer
            );
        }

        match &self.filename {
            Some(filename) => info!("Sending \"{}\" to {}:{}", filename, host, port),
            None => info!("Sending directory contents to {}:{}", host, port),
        }
        if let Some(data_stream) = self.data_stream.as_mut() {
            send_message(data_stream, &payload).await?;
        }
        Ok(())
    }

    /// Extracts the filename and opens it before anything is acknowledged.
    async fn prepare_get(&mut self, request: &str) -> Result<(), SessionError> {
        let args = CommandArgs::split(request)?;
        let (_, filename) = args.pair()?;
        let filename = filename.to_string();

        match get::open_file(&self.settings.root_dir, &filename).await {
            Ok(file) => {
                self.requested_file = Some(file);
                self.filename = Some(filename);
                Ok(())
            }
            Err(e) => {
                debug!("Could not open {:?} for {}: {}", filename, self.peer, e);
                let err = SessionError::FileNotFound(filename);
                if let Some(status) = err.status_message() {
                    self.send_control(status).await?;
                }
                Err(err)
            }
        }
    }

    async fn produce_payload(&mut self) -> Result<Vec<u8>, SessionError> {
        let read = match self.requested_file.as_mut() {
            Some(file) => get::read_file(file).await,
            None => list::list_directory(&self.settings.root_dir).await,
        };
        read.map_err(|e| SessionError::TransferIoFailure(e.to_string()))
    }

    async fn receive_control(&mut self) -> Result<String, SessionError> {
        let message = receive_message(&mut self.control_stream, self.settings.limits).await?;
        if !message.is_complete() {
            debug!(
                "Control message from {} ended after {} bytes without a marker: {:?}",
                self.peer,
                message.body().len(),
                String::from_utf8_lossy(message.body())
            );
        }
        let body = message.into_complete()?;
        String::from_utf8(body).map_err(|e| SessionError::MalformedMessage(e.to_string()))
    }

    async fn send_control(&mut self, text: &str) -> Result<(), SessionError> {
        send_message(&mut self.control_stream, text.as_bytes()).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut data_stream) = self.data_stream.take() {
            if let Err(e) = data_stream.shutdown().await {
                debug!("Closing data connection for {}: {}", self.peer, e);
            }
        }
        if let Err(e) = self.control_stream.shutdown().await {
            debug!("Closing control connection for {}: {}", self.peer, e);
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {}: {:?} -> {:?}", self.peer, self.state, next);
        self.state = next;
    }
}
