//! `PageHandle` implementation over an attached CDP target.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use domproof_core::{ElementState, HarnessError, PageHandle, Result, Selector};

use crate::cdp::{CdpConnection, transport};
use crate::{js, keys};

const NAVIGATION_BUDGET: Duration = Duration::from_secs(30);
const READINESS_POLL: Duration = Duration::from_millis(100);

/// One page inside one isolated browser context.
#[derive(Debug)]
pub struct CdpPage {
    conn: Arc<CdpConnection>,
    session_id: String,
}

impl CdpPage {
    pub(crate) fn new(conn: Arc<CdpConnection>, session_id: String) -> Self {
        Self { conn, session_id }
    }

    pub(crate) fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command(&self, method: &str, params: Value) -> Result<Value> {
        self.conn
            .command(Some(&self.session_id), method, params)
            .await
    }

    /// Evaluate an expression in page context, returning its value.
    async fn eval(&self, expression: &str) -> Result<Value> {
        let result = self
            .command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let text = details
                .get("exception")
                .and_then(|e| e.get("description"))
                .or_else(|| details.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("JavaScript exception");
            return Err(transport(format!("page script failed: {text}")));
        }
        Ok(result
            .pointer("/result/value")
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn await_readiness(&self) -> Result<()> {
        let deadline = Instant::now() + NAVIGATION_BUDGET;
        loop {
            let state = self.eval("document.readyState").await?;
            if matches!(state.as_str(), Some("interactive") | Some("complete")) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(transport("document never became interactive"));
            }
            tokio::time::sleep(READINESS_POLL).await;
        }
    }

    fn not_found(selector: &Selector) -> HarnessError {
        HarnessError::ElementNotFound {
            selector: selector.to_string(),
        }
    }
}

/// `Input.dispatchKeyEvent` payloads for one logical press. A keyDown that
/// carries text makes Chromium synthesize the keypress and text insertion
/// itself; dispatching a separate char event on top would deliver the text a
/// second time.
fn key_event_sequence(def: &keys::KeyDefinition) -> Vec<Value> {
    let mut down = json!({
        "type": "keyDown",
        "key": def.key,
        "code": def.code,
        "windowsVirtualKeyCode": def.key_code,
        "nativeVirtualKeyCode": def.key_code,
    });
    if let Some(text) = &def.text {
        down["text"] = json!(text);
        down["unmodifiedText"] = json!(text);
    }
    let up = json!({
        "type": "keyUp",
        "key": def.key,
        "code": def.code,
        "windowsVirtualKeyCode": def.key_code,
        "nativeVirtualKeyCode": def.key_code,
    });
    vec![down, up]
}

#[async_trait]
impl PageHandle for CdpPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "navigate");
        let result = self.command("Page.navigate", json!({ "url": url })).await?;
        if let Some(reason) = result.get("errorText").and_then(Value::as_str)
            && !reason.is_empty()
        {
            return Err(transport(format!("navigation to {url} failed: {reason}")));
        }
        self.await_readiness().await
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<ElementState>> {
        let value = self.eval(&js::query_expression(selector)).await?;
        let raw = value
            .as_str()
            .ok_or_else(|| transport("query returned no payload"))?;
        serde_json::from_str(raw).map_err(|err| transport(format!("malformed query payload: {err}")))
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let value = self.eval(&js::center_expression(selector)).await?;
        let point: Value = match value.as_str() {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|err| transport(format!("malformed click point: {err}")))?,
            None => return Err(Self::not_found(selector)),
        };
        let x = point.get("x").and_then(Value::as_f64).unwrap_or_default();
        let y = point.get("y").and_then(Value::as_f64).unwrap_or_default();

        for event in ["mousePressed", "mouseReleased"] {
            self.command(
                "Input.dispatchMouseEvent",
                json!({
                    "type": event,
                    "x": x,
                    "y": y,
                    "button": "left",
                    "clickCount": 1,
                }),
            )
            .await?;
        }
        Ok(())
    }

    async fn focus(&self, selector: &Selector) -> Result<()> {
        match self.eval(&js::focus_expression(selector)).await?.as_bool() {
            Some(true) => Ok(()),
            _ => Err(Self::not_found(selector)),
        }
    }

    async fn clear_and_insert(&self, selector: &Selector, text: &str) -> Result<()> {
        match self.eval(&js::clear_expression(selector)).await?.as_bool() {
            Some(true) => {}
            _ => return Err(Self::not_found(selector)),
        }
        self.command("Input.insertText", json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let def = keys::lookup(key)?;
        for event in key_event_sequence(&def) {
            self.command("Input.dispatchKeyEvent", event).await?;
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        use base64::Engine as _;

        let result = self
            .command("Page.captureScreenshot", json!({ "format": "png" }))
            .await?;
        let data = result
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| transport("screenshot returned no data"))?;
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|err| transport(format!("screenshot payload not base64: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_keys_dispatch_one_down_and_one_up() {
        let events = key_event_sequence(&keys::lookup("Enter").unwrap());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["type"], "keyDown");
        assert_eq!(events[0]["text"], "\r");
        assert_eq!(events[0]["unmodifiedText"], "\r");
        assert_eq!(events[1]["type"], "keyUp");
        assert!(events[1].get("text").is_none());
    }

    #[test]
    fn no_event_in_the_sequence_is_a_char_event() {
        for key in ["Enter", "a", "Space", "Tab"] {
            let events = key_event_sequence(&keys::lookup(key).unwrap());
            assert!(events.iter().all(|e| e["type"] != "char"), "{key}");
        }
    }

    #[test]
    fn non_text_keys_carry_no_text_on_the_down_event() {
        let events = key_event_sequence(&keys::lookup("Escape").unwrap());
        assert!(events[0].get("text").is_none());
        assert_eq!(events[0]["windowsVirtualKeyCode"], 27);
    }
}
