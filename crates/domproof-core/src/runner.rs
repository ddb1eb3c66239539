//! Scenario runner: sequences actions, waits and assertions over one
//! isolated session per scenario, with guaranteed teardown.

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::driver::InteractionDriver;
use crate::error::Result;
use crate::page::{PageHandle, SessionFactory};
use crate::report::Reporter;
use crate::result::{AssertionRecord, Outcome, ScenarioResult};
use crate::scenario::{Scenario, Step};
use crate::wait::{WaitConfig, wait_for};

/// Runs scenarios against sessions spawned by `factory`.
///
/// One scenario is a sequential chain of suspending operations on its own
/// session; `run_all` overlaps scenarios freely because sessions share no
/// state. Nothing is ever retried — a timeout or mismatch is reported, not
/// silently re-attempted.
pub struct ScenarioRunner<F: SessionFactory> {
    factory: F,
    wait: WaitConfig,
    reporter: Option<Reporter>,
}

impl<F: SessionFactory> ScenarioRunner<F> {
    pub fn new(factory: F, wait: WaitConfig) -> Self {
        Self {
            factory,
            wait,
            reporter: None,
        }
    }

    /// Attach a reporter so `Capture` steps persist snapshots.
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// The session factory, for backend-specific cleanup after a run.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub async fn run(&self, scenario: &Scenario) -> ScenarioResult {
        info!(scenario = %scenario.name, "running scenario");
        let started = Instant::now();
        let mut records = Vec::new();

        let mut session = match self.factory.open(&scenario.entry_url).await {
            Ok(session) => session,
            Err(err) => {
                return ScenarioResult {
                    scenario: scenario.name.clone(),
                    records,
                    outcome: Outcome::Error,
                    interrupted: Some(format!("session open failed: {err}")),
                    teardown_error: None,
                    duration_ms: started.elapsed().as_millis() as u64,
                };
            }
        };

        let interrupted = match self
            .execute(scenario, session.page(), &mut records)
            .await
        {
            Ok(()) => None,
            Err(err) => Some(err.to_string()),
        };

        // Teardown runs on every exit path and is reported, never thrown:
        // it must not mask the scenario's real outcome.
        let teardown_error = match session.close().await {
            Ok(()) => None,
            Err(err) => {
                warn!(scenario = %scenario.name, error = %err, "session teardown failed");
                Some(err.to_string())
            }
        };

        let outcome = if interrupted.is_some() {
            Outcome::Error
        } else if records.iter().any(|r| !r.passed) {
            Outcome::Fail
        } else {
            Outcome::Pass
        };

        ScenarioResult {
            scenario: scenario.name.clone(),
            records,
            outcome,
            interrupted,
            teardown_error,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Run every scenario concurrently, each against its own session.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        futures::future::join_all(scenarios.iter().map(|s| self.run(s))).await
    }

    async fn execute(
        &self,
        scenario: &Scenario,
        page: &dyn PageHandle,
        records: &mut Vec<AssertionRecord>,
    ) -> Result<()> {
        let driver = InteractionDriver::new(page, self.wait);

        for step in &scenario.steps {
            match step {
                Step::Navigate { url } => page.navigate(url).await?,
                Step::Click { selector } => driver.click(selector).await?,
                Step::Fill { selector, text } => driver.fill(selector, text).await?,
                Step::Press { key } => driver.press_key(key).await?,
                Step::Focus { selector } => driver.focus(selector).await?,
                Step::WaitFor {
                    condition,
                    timeout_ms,
                } => {
                    let config = match timeout_ms {
                        Some(ms) => self.wait.with_timeout_ms(*ms),
                        None => self.wait,
                    };
                    wait_for(page, condition, &config).await?;
                }
                Step::Capture { label } => {
                    if let Some(reporter) = &self.reporter {
                        let png = page.screenshot().await?;
                        let path =
                            reporter.save_snapshot(&format!("{}-{label}", scenario.name), &png)?;
                        debug!(scenario = %scenario.name, path = %path.display(), "snapshot saved");
                    }
                }
                Step::Assert { check } => {
                    let record = check.evaluate(page).await?;
                    debug!(
                        check = %record.name,
                        passed = record.passed,
                        "assertion evaluated"
                    );
                    records.push(record);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPage, MockSessionFactory};
    use crate::page::ElementState;
    use crate::scenario::{Check, Expect, Probe};
    use crate::selector::Selector;
    use crate::wait::Condition;

    fn quick() -> WaitConfig {
        WaitConfig {
            timeout_ms: 120,
            poll_ms: 10,
        }
    }

    fn title_page() -> MockPage {
        MockPage::new().with_element(
            "#missionTitle",
            ElementState {
                visible: true,
                text: "Plani i Misionit".into(),
                ..Default::default()
            },
        )
    }

    fn title_check(expected: &str) -> Step {
        Step::Assert {
            check: Check {
                name: "mission title".into(),
                selector: Selector::css("#missionTitle"),
                probe: Probe::Text,
                expect: Expect::Equals(expected.into()),
            },
        }
    }

    #[tokio::test]
    async fn passing_scenario_closes_its_session() {
        let factory = MockSessionFactory::new(title_page);
        let runner = ScenarioRunner::new(factory, quick());
        let scenario =
            Scenario::new("localization", "file:///index.html").step(title_check("Plani i Misionit"));

        let result = runner.run(&scenario).await;
        assert_eq!(result.outcome, Outcome::Pass);
        assert!(result.interrupted.is_none());
        assert_eq!(runner.factory.closed(), 1);
    }

    #[tokio::test]
    async fn failed_assertion_does_not_stop_independent_assertions() {
        let factory = MockSessionFactory::new(title_page);
        let runner = ScenarioRunner::new(factory, quick());
        let scenario = Scenario::new("localization", "file:///index.html")
            .step(title_check("Mission Plan"))
            .step(title_check("Plani i Misionit"));

        let result = runner.run(&scenario).await;
        assert_eq!(result.outcome, Outcome::Fail);
        assert_eq!(result.records.len(), 2);
        assert!(!result.records[0].passed);
        assert!(result.records[1].passed);
        assert_eq!(runner.factory.closed(), 1);
    }

    #[tokio::test]
    async fn structural_timeout_errors_and_still_tears_down() {
        let factory = MockSessionFactory::new(MockPage::new);
        let runner = ScenarioRunner::new(factory, quick());
        let scenario = Scenario::new("sanitization", "file:///index.html")
            .step(Step::WaitFor {
                condition: Condition::Present {
                    selector: Selector::css("#reviewModal"),
                },
                timeout_ms: Some(60),
            })
            .step(title_check("never evaluated"));

        let result = runner.run(&scenario).await;
        assert_eq!(result.outcome, Outcome::Error);
        assert!(result.records.is_empty());
        assert!(result.interrupted.unwrap().contains("#reviewModal"));
        assert_eq!(runner.factory.closed(), 1);
    }

    #[tokio::test]
    async fn teardown_failure_does_not_mask_the_verdict() {
        let factory = MockSessionFactory::new(title_page).fail_close();
        let runner = ScenarioRunner::new(factory, quick());
        let scenario =
            Scenario::new("localization", "file:///index.html").step(title_check("Plani i Misionit"));

        let result = runner.run(&scenario).await;
        assert_eq!(result.outcome, Outcome::Pass);
        assert!(result.teardown_error.is_some());
    }

    #[tokio::test]
    async fn session_open_failure_is_an_error_outcome() {
        let factory = MockSessionFactory::new(MockPage::new).fail_open();
        let runner = ScenarioRunner::new(factory, quick());
        let scenario = Scenario::new("sanitization", "file:///index.html");

        let result = runner.run(&scenario).await;
        assert_eq!(result.outcome, Outcome::Error);
        assert!(result.interrupted.unwrap().contains("session open failed"));
        assert_eq!(runner.factory.closed(), 0);
    }

    #[tokio::test]
    async fn run_all_gives_each_scenario_its_own_session() {
        let factory = MockSessionFactory::new(title_page);
        let runner = ScenarioRunner::new(factory, quick());
        let scenarios = vec![
            Scenario::new("a", "file:///index.html").step(title_check("Plani i Misionit")),
            Scenario::new("b", "file:///index.html").step(title_check("Plani i Misionit")),
            Scenario::new("c", "file:///index.html").step(title_check("wrong")),
        ];

        let results = runner.run_all(&scenarios).await;
        assert_eq!(results.len(), 3);
        assert_eq!(runner.factory.opened(), 3);
        assert_eq!(runner.factory.closed(), 3);
        assert_eq!(results[2].outcome, Outcome::Fail);
    }

    #[tokio::test]
    async fn not_interactable_click_interrupts_the_scenario() {
        let factory = MockSessionFactory::new(|| {
            MockPage::new().with_element(
                ".view-reviews-btn",
                ElementState {
                    visible: false,
                    ..Default::default()
                },
            )
        });
        let runner = ScenarioRunner::new(factory, quick());
        let scenario = Scenario::new("sanitization", "file:///index.html").step(Step::Click {
            selector: Selector::css(".view-reviews-btn"),
        });

        let result = runner.run(&scenario).await;
        assert_eq!(result.outcome, Outcome::Error);
        let why = result.interrupted.unwrap();
        assert!(why.contains("not interactable"), "unexpected: {why}");
    }
}
