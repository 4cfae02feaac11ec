use crate::constants::{DEFAULT_FRAGMENT_SIZE, DEFAULT_MAX_MESSAGE_SIZE, END_OF_MESSAGE};
use crate::core_error::FrameError;
use log::{debug, trace};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Bounds applied while accumulating an incoming message.
#[derive(Debug, Clone, Copy)]
pub struct FrameLimits {
    pub max_message_size: usize,
    pub fragment_size: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            fragment_size: DEFAULT_FRAGMENT_SIZE,
        }
    }
}

/// How the accumulation of a message stopped.
#[derive(Debug)]
pub enum FrameEnd {
    Terminator,
    EndOfStream,
    ReadFailed(io::Error),
}

/// Bytes received up to (not including) the end-of-message marker.
#[derive(Debug)]
pub struct Message {
    body: Vec<u8>,
    end: FrameEnd,
}

impl Message {
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.end, FrameEnd::Terminator)
    }

    /// Returns the body only when the marker was actually seen.
    pub fn into_complete(self) -> Result<Vec<u8>, FrameError> {
        match self.end {
            FrameEnd::Terminator => Ok(self.body),
            FrameEnd::EndOfStream => Err(FrameError::Incomplete {
                received: self.body.len(),
            }),
            FrameEnd::ReadFailed(e) => Err(FrameError::Io(e)),
        }
    }
}

/// Reads fragments from `reader` until the end-of-message marker shows up.
///
/// The marker and anything after it are dropped. If the stream ends or a
/// read fails first, whatever was accumulated is returned and the message
/// is flagged incomplete. Growing past `limits.max_message_size` without a
/// marker is an error.
pub async fn receive_message<R>(reader: &mut R, limits: FrameLimits) -> Result<Message, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut accumulator: Vec<u8> = Vec::new();
    let mut fragment = vec![0u8; limits.fragment_size.max(1)];

    loop {
        let chars_read = match reader.read(&mut fragment).await {
            Ok(0) => {
                debug!("End of stream after {} bytes", accumulator.len());
                return Ok(Message {
                    body: accumulator,
                    end: FrameEnd::EndOfStream,
                });
            }
            Ok(n) => n,
            Err(e) => {
                debug!("Read failed after {} bytes: {}", accumulator.len(), e);
                return Ok(Message {
                    body: accumulator,
                    end: FrameEnd::ReadFailed(e),
                });
            }
        };

        // A marker may straddle two fragments.
        let search_from = accumulator.len().saturating_sub(END_OF_MESSAGE.len() - 1);
        accumulator.extend_from_slice(&fragment[..chars_read]);
        trace!("Accumulated {} bytes", accumulator.len());

        if let Some(position) = find_terminator(&accumulator, search_from) {
            if position > limits.max_message_size {
                return Err(FrameError::Overflow {
                    limit: limits.max_message_size,
                });
            }
            accumulator.truncate(position);
            return Ok(Message {
                body: accumulator,
                end: FrameEnd::Terminator,
            });
        }

        // The earliest a future marker could start is the last byte held.
        if accumulator.len().saturating_sub(END_OF_MESSAGE.len() - 1) > limits.max_message_size {
            return Err(FrameError::Overflow {
                limit: limits.max_message_size,
            });
        }
    }
}

/// Appends the end-of-message marker to `payload` and writes all of it.
///
/// A write that accepts zero bytes is a failure, not a retry.
pub async fn send_message<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let mut framed = Vec::with_capacity(payload.len() + END_OF_MESSAGE.len());
    framed.extend_from_slice(payload);
    framed.extend_from_slice(END_OF_MESSAGE);

    let mut chars_written = 0;
    while chars_written < framed.len() {
        let added = writer.write(&framed[chars_written..]).await?;
        if added == 0 {
            return Err(FrameError::ZeroWrite {
                written: chars_written,
                total: framed.len(),
            });
        }
        chars_written += added;
    }
    writer.flush().await?;
    trace!("Sent {} bytes", chars_written);
    Ok(())
}

pub fn contains_terminator(payload: &[u8]) -> bool {
    find_terminator(payload, 0).is_some()
}

fn find_terminator(haystack: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(END_OF_MESSAGE.len())
        .position(|window| window == END_OF_MESSAGE)
        .map(|offset| from + offset)
}
