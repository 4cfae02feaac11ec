// Error kinds for the server process and for individual sessions
use crate::constants::{CLIENT_REFUSED_EXIT_CODE, EXIT_FAILURE_CODE, FILE_NOT_FOUND};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or writing one framed message.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Connection closed after {received} bytes without an end-of-message marker")]
    Incomplete { received: usize },

    #[error("Message exceeds the maximum size of {limit} bytes")]
    Overflow { limit: usize },

    #[error("Peer accepted zero bytes after {written} of {total} bytes were sent")]
    ZeroWrite { written: usize, total: usize },

    #[error("I/O error on connection: {0}")]
    Io(#[from] io::Error),
}

/// Errors that end one session. None of them reach the dispatcher.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open data connection to {host}:{port}: {reason}")]
    DataConnectFailure {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Transfer failed: {0}")]
    TransferIoFailure(String),
}

impl SessionError {
    /// The status string the client sees on the control connection, if any.
    /// Every other failure just closes the connection.
    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            SessionError::FileNotFound(_) => Some(FILE_NOT_FOUND),
            _ => None,
        }
    }
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Incomplete { .. } | FrameError::Overflow { .. } => {
                SessionError::MalformedMessage(err.to_string())
            }
            FrameError::ZeroWrite { .. } | FrameError::Io(_) => {
                SessionError::TransferIoFailure(err.to_string())
            }
        }
    }
}

/// Process-level failures. Any of them terminates the server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Usage error: {0}")]
    UsageError(String),

    #[error("Failed to bind {addr}: {source}")]
    BindFailure {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to accept connection: {0}")]
    AcceptFailure(#[source] io::Error),
}

impl ServerError {
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE_CODE
    }
}

/// Failures on the client side of a transfer.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered with something other than the acknowledgment.
    #[error("{0}")]
    Rejected(String),

    #[error("A file with the name {0:?} already exists. Please move it out of the way to save the requested file.")]
    FileExists(PathBuf),

    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("The server closed the session without opening a data connection")]
    NoDataConnection,

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ClientError {
    /// Refusals by either side exit with 1; bad input and broken
    /// connections exit with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Rejected(_) | ClientError::FileExists(_) => CLIENT_REFUSED_EXIT_CODE,
            _ => EXIT_FAILURE_CODE,
        }
    }
}
