//! Listener configuration

use serde::{Deserialize, Serialize};

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port to listen on (0 requests an ephemeral port)
    pub port: u16,
    /// Address to bind the listener to
    pub bind_addr: String,
    /// Grace period between closing the old listener and rebinding
    /// during a base-path restart, in milliseconds
    pub restart_grace_ms: u64,
    /// Upper bound on any single archivist call, in seconds.
    /// Absent means unbounded: a stalled archivist blocks that request
    /// indefinitely, matching the historical behavior.
    #[serde(default)]
    pub collaborator_timeout_secs: Option<u64>,
    /// Enable CORS (useful for browser-based clients on other origins)
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8120,
            bind_addr: "127.0.0.1".to_string(),
            restart_grace_ms: 50,
            collaborator_timeout_secs: None,
            cors_enabled: false,
        }
    }
}
