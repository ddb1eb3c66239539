//! DOM inspector: structured reads of the current rendered document.

use crate::error::{HarnessError, Result};
use crate::page::{ElementState, PageHandle};
use crate::selector::Selector;

/// Extracts facts from the live DOM. Every call re-queries; nothing is
/// cached, so callers re-read after any interaction or wait.
pub struct DomInspector<'a> {
    page: &'a dyn PageHandle,
}

impl<'a> DomInspector<'a> {
    pub fn new(page: &'a dyn PageHandle) -> Self {
        Self { page }
    }

    pub async fn count(&self, selector: &Selector) -> Result<usize> {
        Ok(self.page.query(selector).await?.len())
    }

    pub async fn text(&self, selector: &Selector) -> Result<String> {
        Ok(self.require_one(selector).await?.text)
    }

    /// Raw serialized markup of the element's content, exactly as the
    /// application rendered it. Escaped entities stay escaped and live tags
    /// stay live; re-escaping here would defeat the sanitization check.
    pub async fn inner_markup(&self, selector: &Selector) -> Result<String> {
        Ok(self.require_one(selector).await?.inner_html)
    }

    pub async fn attribute(&self, selector: &Selector, name: &str) -> Result<Option<String>> {
        Ok(self
            .require_one(selector)
            .await?
            .attribute(name)
            .map(str::to_string))
    }

    async fn require_one(&self, selector: &Selector) -> Result<ElementState> {
        self.page
            .query(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPage;
    use crate::page::ElementState;
    use std::collections::HashMap;

    #[tokio::test]
    async fn reads_attribute_text_and_markup() {
        let mut attributes = HashMap::new();
        attributes.insert("role".to_string(), "status".to_string());
        attributes.insert("aria-live".to_string(), "polite".to_string());
        let page = MockPage::new().with_element(
            ".confirmation-message",
            ElementState {
                visible: true,
                text: "Review Submitted".into(),
                inner_html: "Review Submitted".into(),
                attributes,
            },
        );
        let inspector = DomInspector::new(&page);
        let sel = Selector::css(".confirmation-message");

        assert_eq!(inspector.count(&sel).await.unwrap(), 1);
        assert_eq!(inspector.text(&sel).await.unwrap(), "Review Submitted");
        assert_eq!(
            inspector.attribute(&sel, "aria-live").await.unwrap(),
            Some("polite".to_string())
        );
        assert_eq!(inspector.attribute(&sel, "aria-label").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_element_is_a_structural_failure() {
        let page = MockPage::new();
        let inspector = DomInspector::new(&page);
        let err = inspector
            .text(&Selector::css("#reviewsList"))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::ElementNotFound { .. }));
        // count is a plain observation, not a requirement
        assert_eq!(
            inspector.count(&Selector::css("#reviewsList")).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn markup_is_passed_through_verbatim() {
        let page = MockPage::new().with_element(
            ".review-text",
            ElementState {
                visible: true,
                inner_html: "&lt;b&gt;Safe Text&lt;/b&gt;".into(),
                ..Default::default()
            },
        );
        let inspector = DomInspector::new(&page);
        let markup = inspector
            .inner_markup(&Selector::css(".review-text"))
            .await
            .unwrap();
        assert_eq!(markup, "&lt;b&gt;Safe Text&lt;/b&gt;");
    }
}
