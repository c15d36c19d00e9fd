//! IPC client for communicating with the liftlog daemon.
//!
//! This module provides:
//! - Unix Domain Socket client speaking line-delimited JSON
//! - Connection retry logic
//! - Timeout handling
//! - A stream of update events for `watch`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::daemon::default_socket_path;
use crate::types::{IpcRequest, IpcResponse, TimerUpdateEvent};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a client for the default socket path.
    pub fn new() -> Result<Self> {
        let socket_path =
            default_socket_path().context("Cannot locate the home directory for the socket")?;
        Ok(Self::with_socket_path(socket_path))
    }

    /// Creates a client for a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Creates a client for `socket_path`, or the default path when `None`.
    pub fn for_socket(socket_path: Option<PathBuf>) -> Result<Self> {
        match socket_path {
            Some(path) => Ok(Self::with_socket_path(path)),
            None => Self::new(),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends a request and returns the daemon's success response.
    ///
    /// Connection problems are retried; an error response from the daemon is
    /// returned as an error right away.
    pub async fn request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let response = self.send_request_with_retry(request).await?;
        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }
        Ok(response)
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.request(&IpcRequest::Status).await
    }

    /// Opens a watch stream.
    ///
    /// Returns the acknowledgement together with the stream of updates that
    /// follows it.
    pub async fn watch(&self) -> Result<(IpcResponse, WatchStream)> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();
        write_request(&mut writer, &IpcRequest::Watch).await?;

        let mut lines = BufReader::new(reader).lines();
        let ack = read_response(&mut lines).await?;
        if !ack.is_success() {
            anyhow::bail!("{}", ack.message);
        }

        Ok((
            ack,
            WatchStream {
                lines,
                _writer: writer,
            },
        ))
    }

    /// Sends a request to the daemon with retry logic.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!("Request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("No request attempt was made")))
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();
        write_request(&mut writer, request).await?;

        let mut lines = BufReader::new(reader).lines();
        read_response(&mut lines).await
    }

    async fn connect(&self) -> Result<UnixStream> {
        timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .with_context(|| {
                format!(
                    "Cannot connect to the daemon at {}. Start it with 'liftlog daemon'",
                    self.socket_path.display()
                )
            })
    }
}

// ============================================================================
// WatchStream
// ============================================================================

/// Update events streamed by the daemon after a `watch` request.
///
/// Dropping the stream closes the connection and detaches the watcher.
#[derive(Debug)]
pub struct WatchStream {
    lines: Lines<BufReader<OwnedReadHalf>>,
    /// Held open; the daemon treats EOF from the client as a hang-up.
    _writer: OwnedWriteHalf,
}

impl WatchStream {
    /// Waits for the next update. `None` once the daemon closed the stream.
    pub async fn next(&mut self) -> Result<Option<TimerUpdateEvent>> {
        let Some(line) = self
            .lines
            .next_line()
            .await
            .context("Failed to read update")?
        else {
            return Ok(None);
        };
        let event = serde_json::from_str(&line).context("Failed to parse update")?;
        Ok(Some(event))
    }
}

async fn write_request(writer: &mut OwnedWriteHalf, request: &IpcRequest) -> Result<()> {
    let mut json = serde_json::to_vec(request).context("Failed to serialize request")?;
    json.push(b'\n');

    timeout(Duration::from_secs(IO_TIMEOUT_SECS), writer.write_all(&json))
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

    timeout(Duration::from_secs(IO_TIMEOUT_SECS), writer.flush())
        .await
        .context("Flush timed out")?
        .context("Failed to flush request")?;

    Ok(())
}

async fn read_response(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> Result<IpcResponse> {
    let line = timeout(Duration::from_secs(IO_TIMEOUT_SECS), lines.next_line())
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?
        .context("The daemon closed the connection without a response")?;

    if line.len() > MAX_RESPONSE_SIZE {
        anyhow::bail!("Response too large (max {} bytes)", MAX_RESPONSE_SIZE);
    }

    serde_json::from_str(&line).context("Failed to parse response")
}

// ============================================================================
// Tests
// ============================================================================
