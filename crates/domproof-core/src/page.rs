//! Capability surface the engine drives the browser through.
//!
//! The orchestration engine never talks to an automation protocol directly.
//! It consumes three object-safe traits: a [`PageHandle`] exposing the
//! primitive page operations, a [`Session`] owning one isolated browsing
//! context, and a [`SessionFactory`] spawning sessions. The `domproof-browser`
//! crate implements these over the Chrome DevTools Protocol; unit tests swap
//! in scripted in-memory doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::selector::Selector;

/// Facts about one matched element, read from the rendered document at query
/// time.
///
/// `inner_html` is the application's own serialization, passed through
/// verbatim: a sanitized app yields escaped entities here, an unsanitized one
/// yields live tags, and the harness must not blur that distinction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    pub visible: bool,
    pub text: String,
    pub inner_html: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl ElementState {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Primitive operations one loaded document exposes.
///
/// Preconditions (visibility, focus) are the caller's business — the
/// interaction driver layers them on top. A primitive against a selector that
/// matches nothing fails with `ElementNotFound` rather than no-op-ing.
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Resolve `selector` against the current DOM, honoring its pick.
    async fn query(&self, selector: &Selector) -> Result<Vec<ElementState>>;

    async fn click(&self, selector: &Selector) -> Result<()>;

    async fn focus(&self, selector: &Selector) -> Result<()>;

    /// Replace the element's value with `text` (clear-then-type, not append).
    async fn clear_and_insert(&self, selector: &Selector, text: &str) -> Result<()>;

    /// Dispatch a full keydown/keypress/keyup sequence so page code listening
    /// for keyboard events observes genuine input.
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Capture a PNG of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;
}

/// One isolated browsing context bound to exactly one page.
#[async_trait]
pub trait Session: Send + Sync {
    fn page(&self) -> &dyn PageHandle;

    /// Release the context. Safe to call after failures; called exactly once
    /// per opened session by the runner.
    async fn close(&mut self) -> Result<()>;
}

/// Spawns isolated sessions. Sessions share no cookies or storage.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, entry_url: &str) -> Result<Box<dyn Session>>;
}
