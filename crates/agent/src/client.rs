//! Tool host client.
//!
//! Owns the byte-stream channel to a tool host: usually the stdio of a
//! child process this client spawned, in tests any pair of async
//! streams. Requests go out as newline-delimited JSON and responses are
//! correlated back to callers by id through a pending map, so the
//! transport does not care that the workflow only ever has one request
//! in flight.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crabdesk_core::error::ClientError;
use crabdesk_core::wire::{
    InitializeResult, METHOD_INITIALIZE, METHOD_SHUTDOWN, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
    ToolSpec, WireRequest, WireResponse,
};

/// How long a polite shutdown request may take before the child is
/// killed anyway.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<WireResponse>>>>;

/// A connection to one tool host.
pub struct HostClient {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: Pending,
    next_id: AtomicU64,
    startup_timeout: Duration,
    request_timeout: Duration,
    /// `Some` once the `initialize` handshake has succeeded.
    ready: Mutex<Option<InitializeResult>>,
    child: Mutex<Option<Child>>,
}

impl HostClient {
    /// Spawn a host subprocess and take ownership of its stdio. The
    /// child's stderr is inherited so its logs stay visible. No
    /// handshake happens yet; see [`ensure_ready`].
    ///
    /// [`ensure_ready`]: HostClient::ensure_ready
    pub fn spawn<P, I, S>(
        program: P,
        args: I,
        startup_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ClientError>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| ClientError::SpawnFailed(e.to_string()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClientError::SpawnFailed("failed to capture stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClientError::SpawnFailed("failed to capture stdout".into()))?;

        Ok(Self::with_transport(
            stdout,
            Box::new(stdin),
            Some(child),
            startup_timeout,
            request_timeout,
        ))
    }

    /// Attach to an already-open stream pair instead of spawning a
    /// process. Used by tests to run client and host in one process
    /// over a duplex pipe.
    pub fn attach<R, W>(
        reader: R,
        writer: W,
        startup_timeout: Duration,
        request_timeout: Duration,
    ) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::with_transport(reader, Box::new(writer), None, startup_timeout, request_timeout)
    }

    fn with_transport(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: Box<dyn AsyncWrite + Send + Unpin>,
        child: Option<Child>,
        startup_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        spawn_reader(reader, pending.clone());
        Self {
            writer: Mutex::new(writer),
            pending,
            next_id: AtomicU64::new(1),
            startup_timeout,
            request_timeout,
            ready: Mutex::new(None),
            child: Mutex::new(child),
        }
    }

    /// Perform the `initialize` handshake if it has not happened yet,
    /// bounded by the startup timeout. Idempotent: once the host has
    /// answered, the cached result is returned. On expiry the transport
    /// is torn down (the child reaped), and the error is
    /// [`ClientError::StartupTimeout`].
    pub async fn ensure_ready(&self) -> Result<InitializeResult, ClientError> {
        let mut ready = self.ready.lock().await;
        if let Some(info) = ready.as_ref() {
            return Ok(info.clone());
        }

        let value = match self
            .roundtrip(METHOD_INITIALIZE, None, self.startup_timeout)
            .await
        {
            Ok(value) => value,
            Err(ClientError::RequestTimeout { .. }) => {
                self.teardown().await;
                return Err(ClientError::StartupTimeout {
                    timeout_secs: self.startup_timeout.as_secs(),
                });
            }
            Err(e) => return Err(e),
        };

        let info: InitializeResult = serde_json::from_value(value)
            .map_err(|e| ClientError::Protocol(format!("invalid initialize result: {e}")))?;
        info!(
            server = %info.server,
            version = %info.version,
            tools = info.tool_count,
            "tool host ready"
        );
        *ready = Some(info.clone());
        Ok(info)
    }

    /// Fetch the tool catalog.
    pub async fn list_tools(&self) -> Result<Vec<ToolSpec>, ClientError> {
        let result = self
            .roundtrip(METHOD_TOOLS_LIST, None, self.request_timeout)
            .await?;
        serde_json::from_value(result["tools"].clone())
            .map_err(|e| ClientError::Protocol(format!("invalid tools/list result: {e}")))
    }

    /// Call one tool and return its raw result value.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        debug!(tool = %name, "calling tool");
        let params = serde_json::json!({ "name": name, "arguments": arguments });
        self.roundtrip(METHOD_TOOLS_CALL, Some(params), self.request_timeout)
            .await
    }

    /// Ask the host to stop, then tear the transport down. Safe to call
    /// more than once; the kill-on-drop flag backstops paths that never
    /// get here.
    pub async fn shutdown(&self) {
        if self.ready.lock().await.take().is_some() {
            let _ = self.roundtrip(METHOD_SHUTDOWN, None, SHUTDOWN_GRACE).await;
        }
        self.teardown().await;
    }

    async fn teardown(&self) {
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
        drop(writer);

        if let Some(mut child) = self.child.lock().await.take() {
            let _ = child.kill().await;
            let _ = child.wait().await;
        }
    }

    /// One request/response exchange: allocate an id, register the
    /// reply slot, write the line, wait at most `wait`.
    async fn roundtrip(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
        wait: Duration,
    ) -> Result<serde_json::Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let request = WireRequest {
            id,
            method: method.to_string(),
            params,
        };
        let mut line = serde_json::to_string(&request)
            .map_err(|e| ClientError::Protocol(format!("unserializable request: {e}")))?;
        line.push('\n');

        let written = {
            let mut writer = self.writer.lock().await;
            match writer.write_all(line.as_bytes()).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = written {
            self.pending.lock().await.remove(&id);
            return Err(ClientError::ChannelClosed(e.to_string()));
        }

        let response = match timeout(wait, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(ClientError::ChannelClosed(
                    "host hung up before answering".into(),
                ));
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                warn!(%method, timeout_secs = wait.as_secs(), "request timed out");
                return Err(ClientError::RequestTimeout {
                    method: method.to_string(),
                    timeout_secs: wait.as_secs(),
                });
            }
        };

        if let Some(error) = response.error {
            return Err(ClientError::Wire {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| ClientError::Protocol("response carried neither result nor error".into()))
    }
}

/// Read response lines and hand each to its waiting caller. On EOF the
/// pending map is cleared, which fails every outstanding request with
/// `ChannelClosed`.
fn spawn_reader(reader: impl AsyncRead + Send + Unpin + 'static, pending: Pending) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WireResponse>(&line) {
                Ok(response) => {
                    if let Some(tx) = pending.lock().await.remove(&response.id) {
                        let _ = tx.send(response);
                    } else {
                        warn!(id = response.id, "response for unknown request");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "unparseable response line");
                }
            }
        }
        pending.lock().await.clear();
        debug!("host reader exited");
    });
}
