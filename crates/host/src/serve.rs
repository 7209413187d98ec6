//! The newline-delimited JSON serve loop.
//!
//! One `WireRequest` per line in, one `WireResponse` per line out,
//! flushed after every response. The loop is generic over the byte
//! stream so tests can drive it over an in-memory duplex pipe; the
//! production entry point is [`serve_stdio`]. All diagnostics go to
//! `tracing` (stderr in the shipped binary) because stdout belongs to
//! the protocol.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crabdesk_core::Result;
use crabdesk_core::wire::{ErrorCode, METHOD_SHUTDOWN, WireRequest, WireResponse};

use crate::dispatch::ToolHost;

/// Serve until the peer closes the stream or a shutdown request is
/// acknowledged. Malformed lines are answered with `invalid_arguments`
/// (id 0, since no id could be read) and the loop keeps going.
pub async fn serve<R, W>(host: Arc<ToolHost>, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut writer = writer;

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (response, done) = match serde_json::from_str::<WireRequest>(trimmed) {
            Ok(request) => {
                let shutdown = request.method == METHOD_SHUTDOWN;
                let response = host.handle(request).await;
                // Only an acknowledged shutdown ends the loop; a shutdown
                // rejected by the lifecycle gate does not.
                let done = shutdown && response.error.is_none();
                (response, done)
            }
            Err(e) => {
                warn!(error = %e, "malformed request line");
                let response = WireResponse::err(
                    0,
                    ErrorCode::InvalidArguments,
                    format!("malformed request: {e}"),
                );
                (response, false)
            }
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;

        if done {
            info!("serve loop exiting after shutdown");
            return Ok(());
        }
    }

    debug!("peer closed the stream");
    Ok(())
}

/// Serve the process's own stdin/stdout.
pub async fn serve_stdio(host: Arc<ToolHost>) -> Result<()> {
    serve(host, tokio::io::stdin(), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{ReadHalf, WriteHalf, duplex, split};

    use crabdesk_classifier::Classifier;
    use crabdesk_core::category::CategoryRegistry;
    use crabdesk_core::wire::InitializeResult;
    use crabdesk_knowledge::KnowledgeIndex;
    use crabdesk_store::SupportStore;
    use serde_json::json;

    use crate::metrics::HostMetrics;

    fn ready_host() -> Arc<ToolHost> {
        let categories = Arc::new(CategoryRegistry::builtin());
        let classifier = Arc::new(Classifier::new(categories.clone(), 1.0, 1.0));
        let mut index = KnowledgeIndex::new(60, 12);
        index.build(&crate::corpus::builtin_documents()).unwrap();
        let store = Arc::new(SupportStore::with_demo_data(categories.clone()));
        let metrics = Arc::new(HostMetrics::new());
        let registry = crate::tools::default_registry(
            categories,
            classifier,
            Arc::new(index),
            store,
            metrics.clone(),
        );
        let mut host = ToolHost::new("crabdesk-host", metrics);
        host.install(registry);
        Arc::new(host)
    }

    struct Peer {
        writer: WriteHalf<tokio::io::DuplexStream>,
        lines: tokio::io::Lines<BufReader<ReadHalf<tokio::io::DuplexStream>>>,
    }

    impl Peer {
        async fn send_raw(&mut self, line: &str) {
            self.writer.write_all(line.as_bytes()).await.unwrap();
            self.writer.write_all(b"\n").await.unwrap();
            self.writer.flush().await.unwrap();
        }

        async fn roundtrip(&mut self, request: &WireRequest) -> WireResponse {
            self.send_raw(&serde_json::to_string(request).unwrap()).await;
            let line = self.lines.next_line().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }
    }

    fn start(host: Arc<ToolHost>) -> (Peer, tokio::task::JoinHandle<Result<()>>) {
        let (client, server) = duplex(64 * 1024);
        let (server_read, server_write) = split(server);
        let handle = tokio::spawn(serve(host, server_read, server_write));

        let (client_read, client_write) = split(client);
        let peer = Peer {
            writer: client_write,
            lines: BufReader::new(client_read).lines(),
        };
        (peer, handle)
    }

    #[tokio::test]
    async fn initialize_then_call_over_a_pipe() {
        let (mut peer, handle) = start(ready_host());

        let resp = peer
            .roundtrip(&WireRequest { id: 1, method: "initialize".into(), params: None })
            .await;
        let init: InitializeResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(init.tool_count, 8);

        let resp = peer
            .roundtrip(&WireRequest {
                id: 2,
                method: "tools/call".into(),
                params: Some(json!({
                    "name": "classify_query",
                    "arguments": {"query": "I want a refund"}
                })),
            })
            .await;
        assert_eq!(resp.id, 2);
        assert_eq!(resp.result.unwrap()["category"], "returns_refunds");

        drop(peer);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn malformed_line_gets_an_error_and_the_stream_survives() {
        let (mut peer, handle) = start(ready_host());

        peer.send_raw("this is not json").await;
        let line = peer.lines.next_line().await.unwrap().unwrap();
        let resp: WireResponse = serde_json::from_str(&line).unwrap();
        assert_eq!(resp.id, 0);
        assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidArguments);

        // The loop is still serving.
        let resp = peer
            .roundtrip(&WireRequest { id: 5, method: "tools/list".into(), params: None })
            .await;
        assert_eq!(resp.id, 5);
        assert!(resp.result.is_some());

        drop(peer);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let (mut peer, handle) = start(ready_host());

        peer.send_raw("").await;
        peer.send_raw("   ").await;
        let resp = peer
            .roundtrip(&WireRequest { id: 3, method: "tools/list".into(), params: None })
            .await;
        assert_eq!(resp.id, 3);

        drop(peer);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn shutdown_acknowledges_then_ends_the_loop() {
        let (mut peer, handle) = start(ready_host());

        let resp = peer
            .roundtrip(&WireRequest { id: 4, method: "shutdown".into(), params: None })
            .await;
        assert!(resp.error.is_none());

        // The serve task exits on its own, without the peer hanging up.
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn eof_ends_the_loop_cleanly() {
        let (peer, handle) = start(ready_host());
        drop(peer);
        handle.await.unwrap().unwrap();
    }
}
