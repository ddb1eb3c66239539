//! Interaction driver: logical user actions with interactability
//! preconditions.

use tracing::debug;

use crate::error::{HarnessError, Result};
use crate::page::PageHandle;
use crate::selector::Selector;
use crate::wait::{Condition, WaitConfig, wait_for};

/// Translates logical actions (click, fill, press, focus) into page
/// primitives, waiting for the target to become interactable first. A target
/// that never does yields [`HarnessError::NotInteractable`] rather than a
/// silent no-op.
pub struct InteractionDriver<'a> {
    page: &'a dyn PageHandle,
    wait: WaitConfig,
}

impl<'a> InteractionDriver<'a> {
    pub fn new(page: &'a dyn PageHandle, wait: WaitConfig) -> Self {
        Self { page, wait }
    }

    pub async fn click(&self, selector: &Selector) -> Result<()> {
        self.ensure_visible(selector).await?;
        debug!(%selector, "click");
        self.page.click(selector).await
    }

    /// Replace the target's current content with `text`.
    pub async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        self.ensure_visible(selector).await?;
        debug!(%selector, "fill");
        self.page.clear_and_insert(selector, text).await
    }

    /// Focus may target elements that are rendered but not visually exposed
    /// yet (custom controls), so it only requires presence.
    pub async fn focus(&self, selector: &Selector) -> Result<()> {
        self.ensure(Condition::Present {
            selector: selector.clone(),
        })
        .await?;
        debug!(%selector, "focus");
        self.page.focus(selector).await
    }

    /// Dispatch a key to whatever currently holds focus. Keyboard-only
    /// activation paths depend on the page observing the real event sequence.
    pub async fn press_key(&self, key: &str) -> Result<()> {
        debug!(key, "press key");
        self.page.press_key(key).await
    }

    async fn ensure_visible(&self, selector: &Selector) -> Result<()> {
        self.ensure(Condition::Visible {
            selector: selector.clone(),
        })
        .await
    }

    async fn ensure(&self, condition: Condition) -> Result<()> {
        match wait_for(self.page, &condition, &self.wait).await {
            Err(HarnessError::Timeout { last_seen, .. }) => {
                Err(HarnessError::NotInteractable {
                    selector: condition.to_string(),
                    reason: format!("not satisfied within {}ms ({last_seen})", self.wait.timeout_ms),
                })
            }
            other => other,
        }
    }
}
