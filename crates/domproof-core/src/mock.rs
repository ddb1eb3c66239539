//! Scripted in-memory doubles for the capability traits.
//!
//! `MockPage` holds a flat table of element facts plus trigger→mutation
//! rules, so tests can model a page that reacts to clicks, fills and key
//! presses without a browser. Available to downstream crates through the
//! `test-utils` feature.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{HarnessError, Result};
use crate::page::{ElementState, PageHandle, Session, SessionFactory};
use crate::selector::{Pick, Selector};

/// Interaction that fires scripted DOM mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockTrigger {
    Click(String),
    Fill(String),
    Focus(String),
    Key(String),
}

/// Scripted DOM mutation.
#[derive(Debug, Clone)]
pub enum MockEffect {
    Insert { css: String, element: ElementState },
    Remove { css: String },
    SetVisible { css: String, visible: bool },
    SetText { css: String, text: String },
    SetMarkup { css: String, inner_html: String },
    /// Render the last text filled into `input_css` as a new element at
    /// `into_css`, escaped or raw — the mock's model of a sanitizing or
    /// vulnerable application.
    RenderFilled {
        input_css: String,
        into_css: String,
        sanitize: bool,
    },
}

/// Minimal HTML entity escaping, matching what a sanitizing renderer emits.
pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Default)]
struct Recorded {
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    keys: Vec<String>,
    focused: Option<String>,
    navigations: Vec<String>,
}

/// In-memory page double. Selectors match on exact CSS string equality; the
/// text-contains refinement and pick behave like the real transport.
pub struct MockPage {
    dom: Mutex<Vec<(String, ElementState)>>,
    rules: Vec<(MockTrigger, Vec<MockEffect>)>,
    recorded: Mutex<Recorded>,
}

impl MockPage {
    pub fn new() -> Self {
        Self {
            dom: Mutex::new(Vec::new()),
            rules: Vec::new(),
            recorded: Mutex::new(Recorded::default()),
        }
    }

    pub fn with_element(self, css: &str, element: ElementState) -> Self {
        self.dom.lock().unwrap().push((css.to_string(), element));
        self
    }

    pub fn with_rule(mut self, trigger: MockTrigger, effects: Vec<MockEffect>) -> Self {
        self.rules.push((trigger, effects));
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.recorded.lock().unwrap().clicks.clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.recorded.lock().unwrap().keys.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.recorded.lock().unwrap().navigations.clone()
    }

    pub fn query_one(&self, css: &str) -> Option<ElementState> {
        self.dom
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| key == css)
            .map(|(_, state)| state.clone())
    }

    fn fire(&self, trigger: &MockTrigger) {
        let effects: Vec<MockEffect> = self
            .rules
            .iter()
            .filter(|(t, _)| t == trigger)
            .flat_map(|(_, effects)| effects.iter().cloned())
            .collect();
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&self, effect: MockEffect) {
        let mut dom = self.dom.lock().unwrap();
        match effect {
            MockEffect::Insert { css, element } => dom.push((css, element)),
            MockEffect::Remove { css } => dom.retain(|(key, _)| *key != css),
            MockEffect::SetVisible { css, visible } => {
                for (key, state) in dom.iter_mut() {
                    if *key == css {
                        state.visible = visible;
                    }
                }
            }
            MockEffect::SetText { css, text } => {
                for (key, state) in dom.iter_mut() {
                    if *key == css {
                        state.text = text.clone();
                    }
                }
            }
            MockEffect::SetMarkup { css, inner_html } => {
                for (key, state) in dom.iter_mut() {
                    if *key == css {
                        state.inner_html = inner_html.clone();
                    }
                }
            }
            MockEffect::RenderFilled {
                input_css,
                into_css,
                sanitize,
            } => {
                let raw = self
                    .recorded
                    .lock()
                    .unwrap()
                    .fills
                    .iter()
                    .rev()
                    .find(|(css, _)| *css == input_css)
                    .map(|(_, text)| text.clone())
                    .unwrap_or_default();
                let inner_html = if sanitize { escape_html(&raw) } else { raw.clone() };
                dom.push((
                    into_css,
                    ElementState {
                        visible: true,
                        text: raw,
                        inner_html,
                        ..Default::default()
                    },
                ));
            }
        }
    }

    fn resolve(&self, selector: &Selector) -> Vec<ElementState> {
        let dom = self.dom.lock().unwrap();
        let mut matched: Vec<ElementState> = dom
            .iter()
            .filter(|(key, _)| *key == selector.css)
            .map(|(_, state)| state.clone())
            .collect();
        if let Some(text) = &selector.text_contains {
            matched.retain(|state| state.text.contains(text));
        }
        match selector.pick {
            Pick::All => matched,
            Pick::First => matched.into_iter().take(1).collect(),
            Pick::Last => {
                let last = matched.pop();
                last.into_iter().collect()
            }
        }
    }

    fn require(&self, selector: &Selector) -> Result<()> {
        if self.resolve(selector).is_empty() {
            return Err(HarnessError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageHandle for MockPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.recorded.lock().unwrap().navigations.push(url.to_string());
        Ok(())
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<ElementState>> {
        Ok(self.resolve(selector))
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        self.require(selector)?;
        self.recorded.lock().unwrap().clicks.push(selector.css.clone());
        self.fire(&MockTrigger::Click(selector.css.clone()));
        Ok(())
    }

    async fn focus(&self, selector: &Selector) -> Result<()> {
        self.require(selector)?;
        self.recorded.lock().unwrap().focused = Some(selector.css.clone());
        self.fire(&MockTrigger::Focus(selector.css.clone()));
        Ok(())
    }

    async fn clear_and_insert(&self, selector: &Selector, text: &str) -> Result<()> {
        self.require(selector)?;
        self.recorded
            .lock()
            .unwrap()
            .fills
            .push((selector.css.clone(), text.to_string()));
        // replace semantics: the control's content is exactly `text`
        self.apply(MockEffect::SetText {
            css: selector.css.clone(),
            text: text.to_string(),
        });
        self.fire(&MockTrigger::Fill(selector.css.clone()));
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.recorded.lock().unwrap().keys.push(key.to_string());
        self.fire(&MockTrigger::Key(key.to_string()));
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        // PNG magic followed by nothing: enough for evidence-path tests.
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

/// Session double that counts teardowns.
pub struct MockSession {
    page: MockPage,
    closed: Arc<AtomicUsize>,
    fail_close: bool,
}

#[async_trait]
impl Session for MockSession {
    fn page(&self) -> &dyn PageHandle {
        &self.page
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::Relaxed);
        if self.fail_close {
            return Err(HarnessError::Teardown("context already gone".into()));
        }
        Ok(())
    }
}

/// Factory double: builds a fresh scripted page per session, so concurrent
/// scenarios cannot observe each other.
pub struct MockSessionFactory {
    build: Box<dyn Fn() -> MockPage + Send + Sync>,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    fail_open: bool,
    fail_close: bool,
}

impl MockSessionFactory {
    pub fn new(build: impl Fn() -> MockPage + Send + Sync + 'static) -> Self {
        Self {
            build: Box::new(build),
            opened: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            fail_open: false,
            fail_close: false,
        }
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open(&self, entry_url: &str) -> Result<Box<dyn Session>> {
        if self.fail_open {
            return Err(HarnessError::Transport("no browser available".into()));
        }
        self.opened.fetch_add(1, Ordering::Relaxed);
        let page = (self.build)();
        page.navigate(entry_url).await?;
        Ok(Box::new(MockSession {
            page,
            closed: Arc::clone(&self.closed),
            fail_close: self.fail_close,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_contains_and_pick_narrow_matches() {
        let page = MockPage::new()
            .with_element(
                ".review-text",
                ElementState {
                    text: "Good coffee".into(),
                    ..Default::default()
                },
            )
            .with_element(
                ".review-text",
                ElementState {
                    text: "Safe Text here".into(),
                    ..Default::default()
                },
            );

        let all = page.query(&Selector::css(".review-text")).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = page
            .query(&Selector::css(".review-text").containing_text("Safe Text"))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        let last = page.query(&Selector::css(".review-text").last()).await.unwrap();
        assert_eq!(last[0].text, "Safe Text here");
    }

    #[tokio::test]
    async fn click_on_unknown_selector_fails() {
        let page = MockPage::new();
        let err = page.click(&Selector::css("#missing")).await.unwrap_err();
        assert!(matches!(err, HarnessError::ElementNotFound { .. }));
    }
}
