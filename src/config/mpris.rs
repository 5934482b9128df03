use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// MPRIS bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct MprisConfig {
    /// Whether the bridge registers on the session bus at all.
    pub enabled: bool,

    /// Player name shown to MPRIS clients and used for the bus name.
    pub name: String,

    /// The .desktop file name, without the `.desktop` extension.
    pub desktop_entry: Option<String>,

    /// How long `stop` waits for the server thread before giving up, in milliseconds.
    pub shutdown_timeout_ms: u64,
}

impl MprisConfig {
    /// Bounded wait applied when joining the server thread.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for MprisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "Sendspin".to_string(),
            desktop_entry: None,
            shutdown_timeout_ms: 1000,
        }
    }
}
