// src/constants.rs

use std::time::Duration;

/// Marks the end of every message, in both directions, on both channels.
pub const END_OF_MESSAGE: &[u8] = b"||";

pub const LIST_CMD: &str = "-l";
pub const GET_CMD: &str = "-g";

pub const FILE_NOT_FOUND: &str = "FILE NOT FOUND";
pub const UNKNOWN_COMMAND: &str = "Unknown command received. Please try again.";

/// Tokens kept by the argument splitter: `(host, port)` or `(command, filename)`.
pub const MAX_CLIENT_ARGS: usize = 2;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_ROOT_DIR: &str = ".";
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1_048_576;
pub const DEFAULT_FRAGMENT_SIZE: usize = 1024;

// Client
pub const CLIENT_MAX_PAYLOAD_SIZE: usize = 512 * 1024 * 1024;
pub const CLIENT_FRAGMENT_SIZE: usize = 64 * 1024;

pub const EXIT_FAILURE_CODE: i32 = 2;
/// Client exit status when the server or the local file system refuses a transfer.
pub const CLIENT_REFUSED_EXIT_CODE: i32 = 1;

/// Pause after a failed accept before the dispatcher tries again.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);
