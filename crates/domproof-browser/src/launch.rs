//! Chromium process launch and DevTools endpoint discovery.

use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cdp::transport;
use domproof_core::Result;

const ENDPOINT_BUDGET: Duration = Duration::from_secs(20);

/// A spawned browser bound to a throwaway profile. The process is killed on
/// drop; the profile directory disappears with its `TempDir`.
pub struct BrowserProcess {
    child: Child,
    pub ws_url: String,
    _profile_dir: tempfile::TempDir,
}

impl BrowserProcess {
    pub async fn kill(&mut self) {
        let _ = self.child.kill().await;
    }
}

/// Launch a headless (or headed) Chromium with remote debugging and wait for
/// its DevTools WebSocket endpoint.
pub async fn launch(headless: bool) -> Result<BrowserProcess> {
    let binary = locate_chromium().ok_or_else(|| {
        transport("no Chrome/Chromium binary found; set DOMPROOF_CHROME to its path")
    })?;
    let port = pick_port()?;
    let profile_dir = tempfile::Builder::new()
        .prefix("domproof-profile-")
        .tempdir()?;

    let mut command = Command::new(&binary);
    command
        .arg(format!("--remote-debugging-port={port}"))
        .arg(format!("--user-data-dir={}", profile_dir.path().display()))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-gpu")
        .arg("about:blank")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    if headless {
        command.arg("--headless=new");
    }

    info!(binary = %binary.display(), port, headless, "launching browser");
    let child = command.spawn()?;
    let ws_url = discover_ws_url(port).await?;
    debug!(ws_url, "devtools endpoint up");

    Ok(BrowserProcess {
        child,
        ws_url,
        _profile_dir: profile_dir,
    })
}

/// Find an installed Chrome/Chromium, `DOMPROOF_CHROME` taking precedence.
pub fn locate_chromium() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DOMPROOF_CHROME") {
        let parsed = PathBuf::from(path);
        if parsed.exists() {
            return Some(parsed);
        }
    }
    candidate_paths().into_iter().find(|path| path.exists())
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/bin/google-chrome"));
        paths.push(PathBuf::from("/usr/bin/google-chrome-stable"));
        paths.push(PathBuf::from("/usr/bin/chromium-browser"));
        paths.push(PathBuf::from("/usr/bin/chromium"));
        paths.push(PathBuf::from("/snap/bin/chromium"));
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from(
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        ));
        paths.push(PathBuf::from(
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ));
        if let Ok(home) = std::env::var("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            );
        }
    }

    #[cfg(target_os = "windows")]
    {
        paths.push(PathBuf::from(
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        ));
        paths.push(PathBuf::from(
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ));
    }

    paths
}

fn pick_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

async fn discover_ws_url(port: u16) -> Result<String> {
    let url = format!("http://127.0.0.1:{port}/json/version");
    let client = reqwest::Client::new();
    let deadline = Instant::now() + ENDPOINT_BUDGET;

    loop {
        if let Ok(response) = client.get(&url).send().await
            && let Ok(value) = response.json::<Value>().await
            && let Some(ws) = value.get("webSocketDebuggerUrl").and_then(Value::as_str)
        {
            return Ok(ws.to_string());
        }
        if Instant::now() >= deadline {
            return Err(transport(format!(
                "DevTools endpoint on port {port} never came up"
            )));
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_paths_exist_for_this_platform() {
        assert!(!candidate_paths().is_empty());
    }

    #[test]
    fn picked_ports_are_ephemeral() {
        let port = pick_port().unwrap();
        assert!(port >= 1024);
    }
}
