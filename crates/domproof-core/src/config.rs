//! Harness configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::wait::WaitConfig;

/// Run-wide settings, loadable from a TOML file. Unknown keys are rejected so
/// a typoed option never silently falls back to a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Entry document for scenarios that do not override it.
    pub entry_url: Option<String>,
    /// Where snapshot artifacts land.
    pub evidence_dir: PathBuf,
    pub headless: bool,
    pub wait: WaitConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            entry_url: None,
            evidence_dir: PathBuf::from("evidence"),
            headless: true,
            wait: WaitConfig::default(),
        }
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = HarnessConfig::default();
        assert!(config.headless);
        assert_eq!(config.wait.timeout_ms, 8000);
        assert_eq!(config.wait.poll_ms, 100);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: HarnessConfig = toml::from_str(
            r#"
            entry_url = "file:///srv/app/index.html"

            [wait]
            timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.entry_url.as_deref(), Some("file:///srv/app/index.html"));
        assert_eq!(config.wait.timeout_ms, 5000);
        assert_eq!(config.wait.poll_ms, 100);
    }

    #[test]
    fn unknown_options_are_rejected() {
        let err = toml::from_str::<HarnessConfig>("timeoutMs = 5000").unwrap_err();
        assert!(err.to_string().contains("timeoutMs"));
    }
}
