//! Configuration for webshelf

mod library;
mod logging;
mod preferences;
mod server;

pub use library::LibraryConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use preferences::Preferences;
pub use server::ServerConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the webshelf server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listener configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Archive and display configuration
    #[serde(default)]
    pub library: LibraryConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass rather than playing whack-a-mole.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Server validation (port 0 is allowed: it requests an ephemeral port)
        if self.server.bind_addr.parse::<std::net::IpAddr>().is_err() {
            errors.push(format!(
                "bind_addr '{}' is not a valid IP address",
                self.server.bind_addr
            ));
        }
        if self.server.restart_grace_ms == 0 {
            errors.push("restart_grace_ms must be positive".to_string());
        }
        if self.server.collaborator_timeout_secs == Some(0) {
            errors.push("collaborator_timeout_secs must be positive when set".to_string());
        }

        // Library validation
        if self.library.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }
        if self.library.site_dir.as_os_str().is_empty() {
            errors.push("site_dir must not be empty".to_string());
        }
        if self.library.max_title_length == 0 {
            errors.push("max_title_length must be positive".to_string());
        }
        if self.library.max_highlightable_length == 0 {
            errors.push("max_highlightable_length must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config::default()
    }

    // ========================================================================
    // Config::validate – happy path
    // ========================================================================

    #[test]
    fn default_config_passes_validation() {
        let cfg = valid_config();
        assert!(cfg.validate().is_ok(), "default config should be valid");
    }

    // ========================================================================
    // Config::validate – server errors
    // ========================================================================

    #[test]
    fn validate_rejects_bad_bind_addr() {
        let mut cfg = valid_config();
        cfg.server.bind_addr = "not-an-ip".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("not a valid IP address"));
    }

    #[test]
    fn validate_accepts_port_zero_for_ephemeral_binding() {
        let mut cfg = valid_config();
        cfg.server.port = 0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_restart_grace() {
        let mut cfg = valid_config();
        cfg.server.restart_grace_ms = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("restart_grace_ms must be positive"));
    }

    #[test]
    fn validate_rejects_zero_collaborator_timeout() {
        let mut cfg = valid_config();
        cfg.server.collaborator_timeout_secs = Some(0);
        let err = cfg.validate().unwrap_err();
        assert!(err
            .to_string()
            .contains("collaborator_timeout_secs must be positive"));
    }

    #[test]
    fn validate_accepts_absent_collaborator_timeout() {
        let mut cfg = valid_config();
        cfg.server.collaborator_timeout_secs = None;
        assert!(cfg.validate().is_ok());
    }

    // ========================================================================
    // Config::validate – library errors
    // ========================================================================

    #[test]
    fn validate_rejects_empty_data_dir() {
        let mut cfg = valid_config();
        cfg.library.data_dir = PathBuf::from("");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("data_dir must not be empty"));
    }

    #[test]
    fn validate_rejects_zero_max_title_length() {
        let mut cfg = valid_config();
        cfg.library.max_title_length = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_title_length must be positive"));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.server.bind_addr = "nope".to_string();
        cfg.library.max_title_length = 0;
        cfg.library.max_highlightable_length = 0;
        let err = cfg.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not a valid IP address"));
        assert!(msg.contains("max_title_length must be positive"));
        assert!(msg.contains("max_highlightable_length must be positive"));
    }

    // ========================================================================
    // Default implementations – spot-check important values
    // ========================================================================

    #[test]
    fn default_server_config_values() {
        let srv = ServerConfig::default();
        assert_eq!(srv.port, 8120);
        assert_eq!(srv.bind_addr, "127.0.0.1");
        assert_eq!(srv.restart_grace_ms, 50);
        assert!(srv.collaborator_timeout_secs.is_none());
        assert!(!srv.cors_enabled);
    }

    #[test]
    fn default_library_config_values() {
        let lib = LibraryConfig::default();
        assert!(!lib.data_dir.as_os_str().is_empty());
        assert_eq!(lib.site_dir, PathBuf::from("public"));
        assert!(lib.expose_archive);
        assert_eq!(lib.max_title_length, 140);
        assert_eq!(lib.max_highlightable_length, 3000);
        assert!(!lib.debug_ids);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = valid_config();
        let serialized = toml::to_string(&cfg).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.server.port, cfg.server.port);
        assert_eq!(parsed.library.max_title_length, cfg.library.max_title_length);
    }
}
