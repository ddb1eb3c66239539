//! Chromium backend for domproof.
//!
//! This crate drives a real Chromium over the DevTools protocol and exposes
//! it through the capability traits in `domproof-core`. It covers:
//! - Browser discovery and headless launch with a throwaway profile
//! - A shared WebSocket connection multiplexing DevTools commands
//! - Isolated per-scenario sessions backed by separate browser contexts
//! - DOM queries, pointer/keyboard input, and screenshot capture

mod cdp;
mod js;
mod keys;
mod launch;
mod page;
mod session;

pub use launch::{BrowserProcess, locate_chromium};
pub use page::CdpPage;
pub use session::{ChromiumFactory, ChromiumSession};
