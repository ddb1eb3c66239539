//! Condition waiter: polls a DOM predicate until it holds or a deadline
//! elapses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{HarnessError, Result};
use crate::page::PageHandle;
use crate::selector::Selector;

const DEFAULT_TIMEOUT_MS: u64 = 8000;
const DEFAULT_POLL_MS: u64 = 100;

/// Deadline and poll interval for condition waits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub timeout_ms: u64,
    pub poll_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_ms: DEFAULT_POLL_MS,
        }
    }
}

impl WaitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll(&self) -> Duration {
        // A zero interval would busy-spin against the transport.
        Duration::from_millis(self.poll_ms.max(1))
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A predicate over current page state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Selector resolves to at least one element.
    Present { selector: Selector },
    /// Selector resolves to at least one visible element.
    Visible { selector: Selector },
    /// Some matching element's text contains `text`.
    TextContains { selector: Selector, text: String },
    /// Some matching element carries attribute `name` equal to `value`.
    AttributeEquals {
        selector: Selector,
        name: String,
        value: String,
    },
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present { selector } => write!(f, "{selector} present"),
            Condition::Visible { selector } => write!(f, "{selector} visible"),
            Condition::TextContains { selector, text } => {
                write!(f, "{selector} text containing {text:?}")
            }
            Condition::AttributeEquals {
                selector,
                name,
                value,
            } => write!(f, "{selector} with {name}={value:?}"),
        }
    }
}

enum Observation {
    Satisfied,
    Unsatisfied(String),
}

impl Condition {
    fn selector(&self) -> &Selector {
        match self {
            Condition::Present { selector }
            | Condition::Visible { selector }
            | Condition::TextContains { selector, .. }
            | Condition::AttributeEquals { selector, .. } => selector,
        }
    }

    async fn observe(&self, page: &dyn PageHandle) -> Result<Observation> {
        let elements = page.query(self.selector()).await?;
        if elements.is_empty() {
            return Ok(Observation::Unsatisfied("no matching element".into()));
        }

        let seen = match self {
            Condition::Present { .. } => return Ok(Observation::Satisfied),
            Condition::Visible { .. } => {
                if elements.iter().any(|e| e.visible) {
                    return Ok(Observation::Satisfied);
                }
                format!("{} matched, none visible", elements.len())
            }
            Condition::TextContains { text, .. } => {
                if elements.iter().any(|e| e.text.contains(text)) {
                    return Ok(Observation::Satisfied);
                }
                format!("text was {:?}", elements[0].text)
            }
            Condition::AttributeEquals { name, value, .. } => {
                if elements
                    .iter()
                    .any(|e| e.attribute(name) == Some(value.as_str()))
                {
                    return Ok(Observation::Satisfied);
                }
                match elements[0].attribute(name) {
                    Some(actual) => format!("attribute {name} was {actual:?}"),
                    None => format!("attribute {name} absent"),
                }
            }
        };
        Ok(Observation::Unsatisfied(seen))
    }
}

/// Re-evaluate `condition` every poll interval until it holds.
///
/// On deadline the error carries the condition description and the last
/// observed state, never a bare timeout.
pub async fn wait_for(
    page: &dyn PageHandle,
    condition: &Condition,
    config: &WaitConfig,
) -> Result<()> {
    let deadline = Instant::now() + config.timeout();
    let mut last_seen = String::from("not yet evaluated");

    loop {
        match condition.observe(page).await? {
            Observation::Satisfied => {
                debug!(condition = %condition, "condition satisfied");
                return Ok(());
            }
            Observation::Unsatisfied(seen) => last_seen = seen,
        }

        if Instant::now() >= deadline {
            return Err(HarnessError::Timeout {
                condition: condition.to_string(),
                last_seen,
            });
        }
        tokio::time::sleep(config.poll()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPage;
    use crate::page::ElementState;

    fn visible(text: &str) -> ElementState {
        ElementState {
            visible: true,
            text: text.into(),
            ..Default::default()
        }
    }

    fn quick() -> WaitConfig {
        WaitConfig {
            timeout_ms: 150,
            poll_ms: 10,
        }
    }

    #[tokio::test]
    async fn satisfied_immediately() {
        let page = MockPage::new().with_element("#missionTitle", visible("Mission Plan"));
        let cond = Condition::Present {
            selector: Selector::css("#missionTitle"),
        };
        wait_for(&page, &cond, &quick()).await.unwrap();
    }

    #[tokio::test]
    async fn timeout_reports_condition_and_last_observation() {
        let page = MockPage::new().with_element("#missionTitle", visible("Mission Plan"));
        let cond = Condition::TextContains {
            selector: Selector::css("#missionTitle"),
            text: "Plani i Misionit".into(),
        };
        let err = wait_for(&page, &cond, &quick()).await.unwrap_err();
        match err {
            HarnessError::Timeout {
                condition,
                last_seen,
            } => {
                assert!(condition.contains("#missionTitle"));
                assert!(last_seen.contains("Mission Plan"));
            }
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[tokio::test]
    async fn hidden_elements_do_not_satisfy_visible() {
        let hidden = ElementState {
            visible: false,
            ..Default::default()
        };
        let page = MockPage::new().with_element(".leaflet-popup-content", hidden);
        let cond = Condition::Visible {
            selector: Selector::css(".leaflet-popup-content"),
        };
        let err = wait_for(&page, &cond, &quick()).await.unwrap_err();
        assert!(err.to_string().contains("none visible"));
    }
}
