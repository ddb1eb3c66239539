//! Session lifecycle over isolated browser contexts.
//!
//! One Chromium process and one DevTools connection serve the whole run;
//! every session gets its own browser context (separate cookies, storage,
//! cache), so concurrent scenarios cannot interfere.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use domproof_core::{HarnessError, PageHandle, Result, Session, SessionFactory};

use crate::cdp::{CdpConnection, transport};
use crate::launch::{self, BrowserProcess};
use crate::page::CdpPage;

/// Spawns one isolated session per scenario against a shared browser.
pub struct ChromiumFactory {
    conn: Arc<CdpConnection>,
    process: Mutex<BrowserProcess>,
}

impl ChromiumFactory {
    /// Launch a browser and connect to its DevTools endpoint.
    pub async fn launch(headless: bool) -> Result<Self> {
        let process = launch::launch(headless).await?;
        let conn = Arc::new(CdpConnection::connect(&process.ws_url).await?);
        Ok(Self {
            conn,
            process: Mutex::new(process),
        })
    }

    /// Best-effort browser shutdown after all scenarios finish. The child is
    /// also killed on drop, so a missed call cannot leak a process.
    pub async fn shutdown(&self) {
        if let Err(err) = self.conn.command(None, "Browser.close", json!({})).await {
            warn!(error = %err, "Browser.close failed, killing process");
        }
        self.process.lock().await.kill().await;
    }
}

#[async_trait]
impl SessionFactory for ChromiumFactory {
    async fn open(&self, entry_url: &str) -> Result<Box<dyn Session>> {
        Ok(Box::new(open_session(&self.conn, entry_url).await?))
    }
}

/// Create an isolated context and attach a page to it, navigated to
/// `entry_url`. A context whose page never came up is disposed before the
/// error is returned, so a failed open leaves nothing behind.
async fn open_session(conn: &Arc<CdpConnection>, entry_url: &str) -> Result<ChromiumSession> {
    let context = conn
        .command(
            None,
            "Target.createBrowserContext",
            json!({ "disposeOnDetach": true }),
        )
        .await?;
    let context_id = required(&context, "browserContextId", "Target.createBrowserContext")?;

    match attach_page(conn, &context_id, entry_url).await {
        Ok(page) => Ok(ChromiumSession {
            conn: Arc::clone(conn),
            page,
            context_id,
            closed: false,
        }),
        Err(err) => {
            if let Err(dispose_err) = conn
                .command(
                    None,
                    "Target.disposeBrowserContext",
                    json!({ "browserContextId": context_id }),
                )
                .await
            {
                warn!(context_id, error = %dispose_err, "orphaned context not disposed");
            }
            Err(err)
        }
    }
}

async fn attach_page(
    conn: &Arc<CdpConnection>,
    context_id: &str,
    entry_url: &str,
) -> Result<CdpPage> {
    let target = conn
        .command(
            None,
            "Target.createTarget",
            json!({ "url": "about:blank", "browserContextId": context_id }),
        )
        .await?;
    let target_id = required(&target, "targetId", "Target.createTarget")?;

    let attached = conn
        .command(
            None,
            "Target.attachToTarget",
            json!({ "targetId": target_id, "flatten": true }),
        )
        .await?;
    let session_id = required(&attached, "sessionId", "Target.attachToTarget")?;

    debug!(context_id, session_id, "session opened");
    let page = CdpPage::new(Arc::clone(conn), session_id);
    for domain in ["Page.enable", "Runtime.enable"] {
        conn.command(Some(page.session_id()), domain, json!({}))
            .await?;
    }
    page.navigate(entry_url).await?;
    Ok(page)
}

fn required(value: &Value, field: &str, method: &str) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| transport(format!("{method} returned no {field}")))
}

/// One open browsing context. Closing disposes the context and everything in
/// it; calling close twice is a no-op.
#[derive(Debug)]
pub struct ChromiumSession {
    conn: Arc<CdpConnection>,
    page: CdpPage,
    context_id: String,
    closed: bool,
}

#[async_trait]
impl Session for ChromiumSession {
    fn page(&self) -> &dyn PageHandle {
        &self.page
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.conn
            .command(
                None,
                "Target.disposeBrowserContext",
                json!({ "browserContextId": self.context_id }),
            )
            .await
            .map(|_| ())
            .map_err(|err| HarnessError::Teardown(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    // DevTools double: answers createBrowserContext, rejects createTarget,
    // and records every method it saw.
    async fn scripted_endpoint() -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let mut methods = Vec::new();
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let request: Value = serde_json::from_str(text.as_str()).unwrap();
                let id = request["id"].as_u64().unwrap();
                let method = request["method"].as_str().unwrap().to_string();
                let response = match method.as_str() {
                    "Target.createBrowserContext" => {
                        json!({ "id": id, "result": { "browserContextId": "ctx-1" } })
                    }
                    "Target.createTarget" => {
                        json!({ "id": id, "error": { "message": "target limit reached" } })
                    }
                    _ => json!({ "id": id, "result": {} }),
                };
                ws.send(Message::text(response.to_string())).await.unwrap();
                let done = method == "Target.disposeBrowserContext";
                methods.push(method);
                if done {
                    break;
                }
            }
            methods
        });
        (format!("ws://{addr}"), server)
    }

    #[tokio::test]
    async fn failed_target_creation_disposes_the_fresh_context() {
        let (ws_url, server) = scripted_endpoint().await;
        let conn = Arc::new(CdpConnection::connect(&ws_url).await.unwrap());

        let err = open_session(&conn, "file:///index.html").await.unwrap_err();
        assert!(err.to_string().contains("Target.createTarget"), "{err}");

        let methods = server.await.unwrap();
        assert_eq!(
            methods,
            [
                "Target.createBrowserContext",
                "Target.createTarget",
                "Target.disposeBrowserContext",
            ]
        );
    }

    #[test]
    fn required_reports_the_missing_field() {
        let err = required(&json!({}), "sessionId", "Target.attachToTarget").unwrap_err();
        assert!(err.to_string().contains("sessionId"));
    }
}
