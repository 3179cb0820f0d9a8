use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde) and api_key is set for api_key auth
/// - Server port is not 0
/// - Search timeout and per-source quota are nonzero
/// - Tracker search URLs carry the {query} placeholder
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if matches!(config.auth.method, crate::config::AuthMethod::ApiKey)
        && config.auth.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is api_key".to_string(),
        ));
    }

    if config.search.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "search.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.search.per_source_quota == 0 {
        return Err(ConfigError::ValidationError(
            "search.per_source_quota cannot be 0".to_string(),
        ));
    }

    for tracker in &config.search.trackers {
        if !tracker.search_url.contains("{query}") {
            return Err(ConfigError::ValidationError(format!(
                "tracker '{}' search_url is missing the {{query}} placeholder",
                tracker.name
            )));
        }
    }

    if config.download.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "download.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, AuthMethod, DatabaseConfig, DownloadConfig, SearchConfig, ServerConfig,
        StorageConfig, TrackerConfig,
    };
    use std::net::IpAddr;

    fn base_config() -> Config {
        Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            search: SearchConfig::default(),
            download: DownloadConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_api_key_required() {
        let mut config = base_config();
        config.auth = AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: None,
        };
        assert!(validate_config(&config).is_err());

        config.auth.api_key = Some("key".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_tracker_placeholder() {
        let mut config = base_config();
        config.search.trackers = vec![TrackerConfig {
            name: "Broken".to_string(),
            search_url: "https://example.org/search".to_string(),
        }];
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_quota_fails() {
        let mut config = base_config();
        config.search.per_source_quota = 0;
        assert!(validate_config(&config).is_err());
    }
}
