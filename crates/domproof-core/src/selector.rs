//! Opaque element locators.
//!
//! A [`Selector`] is resolved against the live document at query time and is
//! never cached across mutations; dynamic content, reloads and locale swaps
//! all change what it matches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the matching elements a query narrows to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pick {
    #[default]
    All,
    First,
    Last,
}

/// A locator expression: a CSS selector, optionally refined by a
/// text-contains match and a first/last pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub css: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_contains: Option<String>,
    #[serde(default)]
    pub pick: Pick,
}

impl Selector {
    pub fn css(expr: impl Into<String>) -> Self {
        Self {
            css: expr.into(),
            text_contains: None,
            pick: Pick::All,
        }
    }

    /// Keep only elements whose text content contains `text`.
    pub fn containing_text(mut self, text: impl Into<String>) -> Self {
        self.text_contains = Some(text.into());
        self
    }

    pub fn first(mut self) -> Self {
        self.pick = Pick::First;
        self
    }

    pub fn last(mut self) -> Self {
        self.pick = Pick::Last;
        self
    }
}

impl From<&str> for Selector {
    fn from(expr: &str) -> Self {
        Selector::css(expr)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.css)?;
        if let Some(text) = &self.text_contains {
            write!(f, ":has-text({text:?})")?;
        }
        match self.pick {
            Pick::All => Ok(()),
            Pick::First => write!(f, " (first)"),
            Pick::Last => write!(f, " (last)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_narrows_and_displays() {
        let sel = Selector::css(".review-item .review-text")
            .containing_text("Safe Text")
            .last();
        assert_eq!(sel.pick, Pick::Last);
        assert_eq!(
            sel.to_string(),
            ".review-item .review-text:has-text(\"Safe Text\") (last)"
        );
    }

    #[test]
    fn serde_roundtrip_keeps_defaults_compact() {
        let sel = Selector::css("#missionTitle");
        let json = serde_json::to_string(&sel).unwrap();
        assert!(!json.contains("text_contains"));
        let back: Selector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sel);
    }
}
