//! Interaction-and-assertion orchestration engine for domproof.
//!
//! This crate sequences asynchronous page operations — navigation, waiting
//! for dynamic content, simulated input, DOM querying — into deterministic,
//! reproducible verification scenarios and reports pass/fail with diagnostic
//! evidence. It supports:
//! - Isolated session lifecycle with teardown guaranteed on every exit path
//! - Non-busy condition polling with diagnostic timeouts
//! - Visibility-gated user interactions (click, fill, focus, key press)
//! - Structured DOM reads (text, attributes, raw serialized markup, counts)
//! - Named scenarios built from explicit step plans, with per-assertion
//!   records and a pass/fail/error verdict
//!
//! The browser itself sits behind the [`page::PageHandle`] /
//! [`page::SessionFactory`] traits; `domproof-browser` provides the Chromium
//! implementation and [`mock`] provides scripted doubles for tests.

pub mod config;
pub mod driver;
pub mod error;
pub mod inspect;
pub mod page;
pub mod report;
pub mod result;
pub mod runner;
pub mod scenario;
pub mod selector;
pub mod suite;
pub mod wait;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use config::HarnessConfig;
pub use driver::InteractionDriver;
pub use error::{HarnessError, Result};
pub use inspect::DomInspector;
pub use page::{ElementState, PageHandle, Session, SessionFactory};
pub use report::{Reporter, exit_code};
pub use result::{AssertionRecord, Outcome, ScenarioResult};
pub use runner::ScenarioRunner;
pub use scenario::{Check, Expect, Probe, Scenario, Step};
pub use selector::{Pick, Selector};
pub use wait::{Condition, WaitConfig, wait_for};
