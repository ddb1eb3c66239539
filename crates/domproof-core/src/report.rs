//! Evidence reporter: human-readable verdict lines and persisted snapshots.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::result::{Outcome, ScenarioResult};

const ACTUAL_PREVIEW_LEN: usize = 160;

/// Renders per-assertion lines and persists visual artifacts keyed by
/// scenario name. Reporting is append-only: individual assertion failures are
/// shown even when the scenario as a whole errored.
#[derive(Debug, Clone)]
pub struct Reporter {
    evidence_dir: PathBuf,
}

impl Reporter {
    pub fn new(evidence_dir: impl Into<PathBuf>) -> Self {
        Self {
            evidence_dir: evidence_dir.into(),
        }
    }

    pub fn evidence_dir(&self) -> &Path {
        &self.evidence_dir
    }

    /// One line per assertion, one verdict line per scenario.
    pub fn render(&self, result: &ScenarioResult) -> String {
        let mut out = String::new();
        for record in &result.records {
            let mark = if record.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "  [{mark}] {}: expected {}, got {:?}\n",
                record.name,
                record.expected,
                preview(&record.actual),
            ));
        }
        if let Some(why) = &result.interrupted {
            out.push_str(&format!("  [ERROR] interrupted: {why}\n"));
        }
        if let Some(why) = &result.teardown_error {
            out.push_str(&format!("  [WARN] teardown: {why}\n"));
        }
        out.push_str(&format!(
            "{}: {} ({}/{} checks, {}ms)\n",
            result.scenario,
            result.outcome,
            result.passed_count(),
            result.records.len(),
            result.duration_ms,
        ));
        out
    }

    pub fn report(&self, result: &ScenarioResult) {
        print!("{}", self.render(result));
    }

    /// Persist a PNG snapshot as `<evidence_dir>/<name>-<timestamp>.png`.
    /// Write-once per run; reruns may overwrite within the same second.
    pub fn save_snapshot(&self, name: &str, png: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.evidence_dir)?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let path = self.evidence_dir.join(format!("{}-{stamp}.png", slug(name)));
        fs::write(&path, png)?;
        debug!(path = %path.display(), "evidence snapshot written");
        Ok(path)
    }
}

/// Aggregate process exit code: non-zero if any scenario failed or errored.
pub fn exit_code(results: &[ScenarioResult]) -> i32 {
    if results.iter().all(ScenarioResult::is_success) {
        0
    } else {
        1
    }
}

fn preview(actual: &str) -> String {
    if actual.len() <= ACTUAL_PREVIEW_LEN {
        return actual.to_string();
    }
    let cut = actual
        .char_indices()
        .take_while(|(i, _)| *i < ACTUAL_PREVIEW_LEN)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    format!("{}…", &actual[..cut])
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
