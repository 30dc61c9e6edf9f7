//! Settings schema for the bridge.
//!
//! All settings use `#[serde(default)]` so partial configuration files
//! work; missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Root settings structure, loaded from `~/.rbridge/settings.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Schema version for migrations.
    pub version: u32,

    /// Delay between poll cycles, in milliseconds.
    pub poll_interval_ms: u64,

    /// Delay before retrying after a failed poll cycle, in milliseconds.
    pub retry_delay_ms: u64,

    /// Commands sent to the session once it reports init-complete.
    pub bootstrap_commands: Vec<String>,

    /// Whether to fetch plot binaries when the session renders one.
    pub fetch_plots: bool,

    /// Tracing filter directive, e.g. "rbridge=debug".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            version: 1,
            poll_interval_ms: 300,
            retry_delay_ms: 1000,
            bootstrap_commands: Vec::new(),
            fetch_plots: true,
            log_filter: None,
        }
    }
}
