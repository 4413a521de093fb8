use serde::Deserialize;

/// Service configuration, loaded from `danks.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub listen_addr: String,
    pub max_rooms: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8081".to_string(),
            max_rooms: 100,
        }
    }
}

impl RelayConfig {
    /// Validate configuration, exiting on values the service cannot run with.
    pub fn validate(&self) {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            tracing::error!(
                addr = %self.listen_addr,
                "listen_addr is not a valid socket address"
            );
            std::process::exit(1);
        }
        if self.max_rooms == 0 {
            tracing::error!("max_rooms must be > 0");
            std::process::exit(1);
        }
    }

    /// Load config from `danks.toml` if it exists, then apply env var
    /// overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("danks.toml") {
            Ok(content) => match toml::from_str::<RelayConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from danks.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse danks.toml: {e}, using defaults");
                    RelayConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No danks.toml found, using defaults");
                RelayConfig::default()
            },
        };

        if let Ok(addr) = std::env::var("DANKS_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(val) = std::env::var("DANKS_MAX_ROOMS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.max_rooms = n;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8081");
        assert_eq!(cfg.max_rooms, 100);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
listen_addr = "127.0.0.1:9090"
max_rooms = 5
"#;
        let cfg: RelayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9090");
        assert_eq!(cfg.max_rooms, 5);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: RelayConfig = toml::from_str("max_rooms = 7").unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8081");
        assert_eq!(cfg.max_rooms, 7);
    }

    #[test]
    fn validate_accepts_defaults() {
        RelayConfig::default().validate();
    }

    #[test]
    fn invalid_addr_detected() {
        let cfg = RelayConfig {
            listen_addr: "not-an-address".to_string(),
            ..RelayConfig::default()
        };
        // validate() exits the process, so test the underlying check.
        assert!(cfg.listen_addr.parse::<std::net::SocketAddr>().is_err());
    }
}
