use crate::config::types::{Config, FetchConfig, StorageConfig, SyncConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_sync_config(&config.sync)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates sync configuration
fn validate_sync_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.lookback_days < 1 {
        return Err(ConfigError::Validation(format!(
            "lookback-days must be >= 1, got {}",
            config.lookback_days
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.data_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "data-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let mut config = Config::default();
        config.fetch.user_agent = "  ".to_string();
        let result = validate(&config);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = Config::default();
        config.fetch.max_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let mut config = Config::default();
        config.fetch.request_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_lookback_rejected() {
        let mut config = Config::default();
        config.sync.lookback_days = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_data_dir_rejected() {
        let mut config = Config::default();
        config.storage.data_dir = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_retry_delay_allowed() {
        let mut config = Config::default();
        config.fetch.retry_delay_secs = 0;
        assert!(validate(&config).is_ok());
    }
}
