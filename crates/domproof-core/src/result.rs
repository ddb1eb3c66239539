//! Typed scenario outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One expected-vs-actual comparison, recorded whether or not it passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionRecord {
    pub name: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail => write!(f, "FAIL"),
            Outcome::Error => write!(f, "ERROR"),
        }
    }
}

/// Immutable record of one scenario run.
///
/// `outcome` is `Error` when a structural failure (`interrupted`) stopped the
/// step sequence before every assertion ran, `Fail` when all steps ran but at
/// least one assertion mismatched, else `Pass`. A teardown failure is carried
/// separately and never changes the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub records: Vec<AssertionRecord>,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teardown_error: Option<String>,
    pub duration_ms: u64,
}

impl ScenarioResult {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|r| r.passed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_displays_uppercase() {
        assert_eq!(Outcome::Error.to_string(), "ERROR");
    }

    #[test]
    fn serde_skips_empty_diagnostics() {
        let result = ScenarioResult {
            scenario: "sanitization".into(),
            records: vec![],
            outcome: Outcome::Pass,
            interrupted: None,
            teardown_error: None,
            duration_ms: 12,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("interrupted"));
        assert!(!json.contains("teardown_error"));
    }
}
