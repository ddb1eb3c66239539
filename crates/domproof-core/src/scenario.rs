//! Explicit scenario objects: ordered actions and assertions.
//!
//! A scenario carries everything needed to reproduce it — no ambient state
//! leaks between scenarios, and the full step plan round-trips through serde.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inspect::DomInspector;
use crate::page::PageHandle;
use crate::result::AssertionRecord;
use crate::selector::Selector;
use crate::wait::Condition;

/// A named, self-contained verification scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub entry_url: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, entry_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_url: entry_url.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// One step of a scenario. Actions and waits are structural: if one fails,
/// later steps cannot be trusted and the scenario errors out. Assertions are
/// independent: a mismatch is recorded and execution continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Navigate {
        url: String,
    },
    Click {
        selector: Selector,
    },
    Fill {
        selector: Selector,
        text: String,
    },
    Press {
        key: String,
    },
    Focus {
        selector: Selector,
    },
    WaitFor {
        condition: Condition,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    /// Persist a visual snapshot labeled `label` under the scenario's name.
    Capture {
        label: String,
    },
    Assert {
        check: Check,
    },
}

/// A single named observation with its expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub selector: Selector,
    pub probe: Probe,
    pub expect: Expect,
}

/// What to read from the matched element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Probe {
    Text,
    Attribute { name: String },
    Markup,
    Count,
}

/// How the observed value must relate to the expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    Equals(String),
    Contains(String),
    NotContains(String),
    AtLeast(usize),
}

impl Expect {
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Expect::Equals(want) => actual == want,
            Expect::Contains(want) => actual.contains(want),
            Expect::NotContains(want) => !actual.contains(want),
            Expect::AtLeast(n) => actual.parse::<usize>().map(|c| c >= *n).unwrap_or(false),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Expect::Equals(want) => format!("equals {want:?}"),
            Expect::Contains(want) => format!("contains {want:?}"),
            Expect::NotContains(want) => format!("does not contain {want:?}"),
            Expect::AtLeast(n) => format!("at least {n}"),
        }
    }
}

impl Check {
    /// Read the probed value from the live page and compare it.
    ///
    /// A required element that resolves to nothing is a structural failure
    /// (the caller errors the scenario); a mismatch is plain data. An absent
    /// attribute observes as `(absent)` so the mismatch line stays readable.
    pub async fn evaluate(&self, page: &dyn PageHandle) -> Result<AssertionRecord> {
        let inspector = DomInspector::new(page);
        let actual = match &self.probe {
            Probe::Text => inspector.text(&self.selector).await?,
            Probe::Attribute { name } => inspector
                .attribute(&self.selector, name)
                .await?
                .unwrap_or_else(|| "(absent)".to_string()),
            Probe::Markup => inspector.inner_markup(&self.selector).await?,
            Probe::Count => inspector.count(&self.selector).await?.to_string(),
        };
        let passed = self.expect.matches(&actual);
        Ok(AssertionRecord {
            name: self.name.clone(),
            expected: self.expect.describe(),
            actual,
            passed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::mock::MockPage;
    use crate::page::ElementState;
    use std::collections::HashMap;

    #[test]
    fn steps_roundtrip_as_tagged_json() {
        let scenario = Scenario::new("localization", "file:///index.html")
            .step(Step::Click {
                selector: Selector::css("button[data-lang='sq']"),
            })
            .step(Step::Assert {
                check: Check {
                    name: "mission title translated".into(),
                    selector: Selector::css("#missionTitle"),
                    probe: Probe::Text,
                    expect: Expect::Equals("Plani i Misionit".into()),
                },
            });
        let json = serde_json::to_value(&scenario).unwrap();
        assert_eq!(json["steps"][0]["type"], "click");
        assert_eq!(json["steps"][1]["type"], "assert");
        let back: Scenario = serde_json::from_value(json).unwrap();
        assert_eq!(back.steps.len(), 2);
    }

    #[test]
    fn expectations_cover_the_four_relations() {
        assert!(Expect::Equals("Objektivat".into()).matches("Objektivat"));
        assert!(Expect::Contains("&lt;img".into()).matches("x &lt;img y"));
        assert!(Expect::NotContains("<img".into()).matches("&lt;img src=x&gt;"));
        assert!(!Expect::NotContains("<img".into()).matches("<img src=\"x\">"));
        assert!(Expect::AtLeast(2).matches("3"));
        assert!(!Expect::AtLeast(2).matches("not a number"));
    }

    #[tokio::test]
    async fn check_records_mismatch_instead_of_failing() {
        let page = MockPage::new().with_element(
            "#missionTitle",
            ElementState {
                visible: true,
                text: "Mission Plan".into(),
                ..Default::default()
            },
        );
        let check = Check {
            name: "title translated".into(),
            selector: Selector::css("#missionTitle"),
            probe: Probe::Text,
            expect: Expect::Equals("Plani i Misionit".into()),
        };
        let record = check.evaluate(&page).await.unwrap();
        assert!(!record.passed);
        assert_eq!(record.actual, "Mission Plan");
        assert!(record.expected.contains("Plani i Misionit"));
    }

    #[tokio::test]
    async fn check_on_missing_element_errors() {
        let page = MockPage::new();
        let check = Check {
            name: "confirmation role".into(),
            selector: Selector::css(".confirmation-message"),
            probe: Probe::Attribute {
                name: "role".into(),
            },
            expect: Expect::Equals("status".into()),
        };
        let err = check.evaluate(&page).await.unwrap_err();
        assert!(matches!(err, HarnessError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn absent_attribute_reads_as_placeholder() {
        let page = MockPage::new().with_element(
            ".rating-static",
            ElementState {
                visible: true,
                attributes: HashMap::new(),
                ..Default::default()
            },
        );
        let check = Check {
            name: "rating role".into(),
            selector: Selector::css(".rating-static"),
            probe: Probe::Attribute {
                name: "role".into(),
            },
            expect: Expect::Equals("img".into()),
        };
        let record = check.evaluate(&page).await.unwrap();
        assert!(!record.passed);
        assert_eq!(record.actual, "(absent)");
    }
}
