use clap::Parser;
use std::path::PathBuf;

use domproof_core::HarnessConfig;

#[derive(Parser, Debug)]
#[command(name = "domproof")]
#[command(version, about = "domproof - browser-driven DOM verification harness")]
pub struct Cli {
    /// Entry document URL (file:// or http://)
    #[arg(long, env = "DOMPROOF_ENTRY_URL")]
    pub entry_url: Option<String>,

    /// Config file (TOML); flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for snapshot evidence
    #[arg(long)]
    pub evidence_dir: Option<PathBuf>,

    /// Run with a visible browser window
    #[arg(long)]
    pub headed: bool,

    /// Only run scenarios whose name contains this substring
    #[arg(long)]
    pub filter: Option<String>,

    /// Condition wait budget in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Poll interval in milliseconds
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// List scenario names without running anything
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    /// Merge flags over the file-based config. Flags win; absent flags leave
    /// the config untouched.
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(url) = &self.entry_url {
            config.entry_url = Some(url.clone());
        }
        if let Some(dir) = &self.evidence_dir {
            config.evidence_dir = dir.clone();
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(ms) = self.timeout_ms {
            config.wait.timeout_ms = ms;
        }
        if let Some(ms) = self.poll_ms {
            config.wait.poll_ms = ms;
        }
    }
}
