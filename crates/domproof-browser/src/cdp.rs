//! Minimal Chrome DevTools Protocol client over one WebSocket.
//!
//! Commands are correlated to responses by id; protocol events carry no id
//! and are skipped — the harness polls DOM state instead of subscribing.

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

use domproof_core::{HarnessError, Result};

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;

pub(crate) fn transport(err: impl std::fmt::Display) -> HarnessError {
    HarnessError::Transport(err.to_string())
}

/// One connection to a browser's DevTools endpoint, shared by every session.
#[derive(Debug)]
pub struct CdpConnection {
    sink: Mutex<WsSink>,
    pending: Pending,
    next_id: AtomicU64,
    reader: tokio::task::JoinHandle<()>,
}

impl CdpConnection {
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let (stream, _) = connect_async(ws_url).await.map_err(transport)?;
        let (sink, mut source) = stream.split();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

        let reader = tokio::spawn({
            let pending = Arc::clone(&pending);
            async move {
                while let Some(message) = source.next().await {
                    let Ok(Message::Text(text)) = message else {
                        continue;
                    };
                    let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                        continue;
                    };
                    match value.get("id").and_then(Value::as_u64) {
                        Some(id) => {
                            if let Some(tx) = pending.lock().await.remove(&id) {
                                let _ = tx.send(value);
                            }
                        }
                        // event; not consumed
                        None => trace!(
                            method = value.get("method").and_then(serde_json::Value::as_str),
                            "cdp event skipped"
                        ),
                    }
                }
            }
        });

        Ok(Self {
            sink: Mutex::new(sink),
            pending,
            next_id: AtomicU64::new(0),
            reader,
        })
    }

    /// Send one command and await its response, optionally scoped to an
    /// attached target session.
    pub async fn command(
        &self,
        session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut message = json!({ "id": id, "method": method, "params": params });
        if let Some(session) = session_id {
            message["sessionId"] = json!(session);
        }

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);
        debug!(method, id, "cdp command");

        self.sink
            .lock()
            .await
            .send(Message::text(message.to_string()))
            .await
            .map_err(transport)?;

        let response = match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(transport(format!("connection closed during {method}"))),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(transport(format!(
                    "no response to {method} within {}s",
                    COMMAND_TIMEOUT.as_secs()
                )));
            }
        };

        if let Some(error) = response.get("error") {
            let reason = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown CDP error");
            return Err(transport(format!("{method} failed: {reason}")));
        }
        Ok(response.get("result").cloned().unwrap_or_else(|| json!({})))
    }
}

impl Drop for CdpConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
