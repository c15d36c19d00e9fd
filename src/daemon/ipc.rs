//! IPC server for the rest timer daemon.
//!
//! Framing is one JSON document per line:
//! - the client sends a single [`IpcRequest`] line
//! - the server answers with a single [`IpcResponse`] line
//! - for `watch`, the response is followed by one [`TimerUpdateEvent`] line
//!   per update until either side hangs up
//!
//! Watch clients must keep their write half open; EOF from the client ends
//! the stream.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::timer::{ListenerId, RestTimer};
use crate::types::{IpcRequest, IpcResponse, ResponseData, TimerPhase, TimerUpdateEvent};

// ============================================================================
// Constants
// ============================================================================

/// Directory under the home directory holding the socket.
const SOCKET_DIR: &str = ".liftlog";

/// Socket file name.
const SOCKET_FILE: &str = "liftlog.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns `~/.liftlog/liftlog.sock`.
pub fn default_socket_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SOCKET_DIR).join(SOCKET_FILE))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Socket binding error
    #[error("Failed to bind socket: {0}")]
    BindError(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Write error
    #[error("Failed to write response: {0}")]
    WriteError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a server bound to `socket_path`.
    ///
    /// A stale socket file is removed and missing parent directories are
    /// created before binding.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .map_err(|e| IpcError::BindError(format!("{:?}: {}", socket_path, e)))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| IpcError::ConnectionError(e.to_string()))?;
        Ok(stream)
    }

    /// Reads and deserializes one request line.
    ///
    /// A request without a trailing newline is accepted when the client
    /// closes its write half right after it.
    pub async fn receive_request<R>(reader: &mut R) -> Result<IpcRequest>
    where
        R: AsyncRead + Unpin,
    {
        let mut limited = BufReader::new(reader).take(MAX_REQUEST_SIZE as u64 + 1);
        let mut line = String::new();

        let n = match timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            limited.read_line(&mut line),
        )
        .await
        {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }
        if line.len() > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_str(line.trim_end())
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends a response line.
    pub async fn send_response<W>(writer: &mut W, response: &IpcResponse) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        write_line(writer, response).await
    }

    /// Serializes and sends an update event line.
    pub async fn send_event<W>(writer: &mut W, event: &TimerUpdateEvent) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        write_line(writer, event).await
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn write_line<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut json =
        serde_json::to_vec(value).map_err(|e| IpcError::SerializationError(e.to_string()))?;
    json.push(b'\n');

    writer
        .write_all(&json)
        .await
        .map_err(|e| IpcError::WriteError(e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| IpcError::WriteError(e.to_string()))?;

    Ok(())
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by driving a [`RestTimer`].
///
/// Commands stay fire-and-forget on the timer side; the handler checks the
/// phase first so the CLI can tell the user why nothing happened, and answers
/// with the state observed right after the command was processed.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    timer: RestTimer,
}

impl RequestHandler {
    pub fn new(timer: RestTimer) -> Self {
        Self { timer }
    }

    /// Handles a request and returns the response.
    ///
    /// For `watch` this is only the acknowledgement; streaming is done by
    /// [`RequestHandler::serve`].
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Start { seconds } => self.handle_start(seconds).await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Resume => self.handle_resume().await,
            IpcRequest::Skip => self.handle_skip().await,
            IpcRequest::Add { seconds } => self.handle_add(seconds).await,
            IpcRequest::Subtract { seconds } => self.handle_subtract(seconds).await,
            IpcRequest::Status => self.respond("").await,
            IpcRequest::Watch => self.respond("Watching rest timer").await,
        }
    }

    /// Serves one connection to completion.
    pub async fn serve(&self, mut stream: UnixStream) -> Result<()> {
        let (mut reader, mut writer) = stream.split();
        let request = IpcServer::receive_request(&mut reader).await?;
        debug!(?request, "Received request");

        if request != IpcRequest::Watch {
            let response = self.handle(request).await;
            return IpcServer::send_response(&mut writer, &response).await;
        }

        // Subscribe before the ack so no update between the two is lost.
        let mut subscription = self.timer.subscribe(ListenerId::next());
        let ack = self.handle(IpcRequest::Watch).await;
        IpcServer::send_response(&mut writer, &ack).await?;

        let mut probe = [0u8; 64];
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => {
                        if IpcServer::send_event(&mut writer, &event).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                read = reader.read(&mut probe) => match read {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                },
            }
        }

        debug!(id = %subscription.id(), "Watcher disconnected");
        Ok(())
    }

    async fn handle_start(&self, seconds: u32) -> IpcResponse {
        if seconds == 0 {
            return IpcResponse::error("Rest duration must be at least 1 second");
        }
        self.timer.start(seconds);
        self.respond("Rest timer started").await
    }

    async fn handle_pause(&self) -> IpcResponse {
        if self.phase().await != TimerPhase::Running {
            return IpcResponse::error("No running rest timer to pause");
        }
        self.timer.pause();
        self.respond("Rest timer paused").await
    }

    async fn handle_resume(&self) -> IpcResponse {
        if self.phase().await != TimerPhase::Paused {
            return IpcResponse::error("No paused rest timer to resume");
        }
        self.timer.resume();
        self.respond("Rest timer resumed").await
    }

    async fn handle_skip(&self) -> IpcResponse {
        if self.phase().await == TimerPhase::Idle {
            return IpcResponse::error("No rest timer to skip");
        }
        self.timer.skip();
        self.respond("Rest timer skipped").await
    }

    async fn handle_add(&self, seconds: u32) -> IpcResponse {
        if seconds == 0 {
            return IpcResponse::error("Time to add must be at least 1 second");
        }
        if self.phase().await == TimerPhase::Idle {
            return IpcResponse::error("No rest timer to extend");
        }
        self.timer.add_time(seconds);
        self.respond(format!("Added {}s", seconds)).await
    }

    async fn handle_subtract(&self, seconds: u32) -> IpcResponse {
        if seconds == 0 {
            return IpcResponse::error("Time to remove must be at least 1 second");
        }
        if self.phase().await == TimerPhase::Idle {
            return IpcResponse::error("No rest timer to shorten");
        }
        self.timer.subtract_time(seconds);
        self.respond(format!("Removed {}s", seconds)).await
    }

    async fn phase(&self) -> TimerPhase {
        self.timer.current_state().await.phase()
    }

    async fn respond(&self, message: impl Into<String>) -> IpcResponse {
        let state = self.timer.current_state().await;
        IpcResponse::success(message, Some(ResponseData::from_timer_state(&state)))
    }
}

// ============================================================================
// Tests
// ============================================================================
