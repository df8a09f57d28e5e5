use super::{types::Config, ConfigError};

/// Upper bound for TTLs and intervals, in seconds (one year).
const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Validate configuration
/// Currently validates:
/// - Directory section exists (enforced by serde) and has a URL
/// - Server port is not 0
/// - Rate limit admits at least one request per non-empty window
/// - Cache capacity and lifetimes are positive, lifetimes at most a year
/// - Scorer weights are non-negative with a positive sum
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.directory.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "directory.url cannot be empty".to_string(),
        ));
    }

    if config.rate_limit.max_requests == 0 {
        return Err(ConfigError::ValidationError(
            "rate_limit.max_requests must be at least 1".to_string(),
        ));
    }
    if config.rate_limit.time_window_ms == 0 {
        return Err(ConfigError::ValidationError(
            "rate_limit.time_window_ms must be positive".to_string(),
        ));
    }

    if config.cache.max_entries == 0 {
        return Err(ConfigError::ValidationError(
            "cache.max_entries must be at least 1".to_string(),
        ));
    }
    if config.cache.default_ttl_secs == 0 || config.cache.max_age_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cache.default_ttl_secs and cache.max_age_secs must be positive".to_string(),
        ));
    }

    let durations = [
        ("cache.default_ttl_secs", config.cache.default_ttl_secs),
        ("cache.max_age_secs", config.cache.max_age_secs),
        ("cache.purge_interval_secs", config.cache.purge_interval_secs),
        ("pipeline.analysis_ttl_secs", config.pipeline.analysis_ttl_secs),
        ("pipeline.search_ttl_secs", config.pipeline.search_ttl_secs),
    ];
    for (name, secs) in durations {
        if secs > MAX_DURATION_SECS {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot exceed {} seconds",
                name, MAX_DURATION_SECS
            )));
        }
    }

    let weights = config.scorer.weights();
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ConfigError::ValidationError(
            "scorer weights must be finite and non-negative".to_string(),
        ));
    }
    if weights.iter().sum::<f32>() <= 0.0 {
        return Err(ConfigError::ValidationError(
            "scorer weights must not all be zero".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.scorer.min_score) {
        return Err(ConfigError::ValidationError(
            "scorer.min_score must be within 0.0-1.0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[directory]
api_key = "key"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_rate_limit_fails() {
        let mut config = valid_config();
        config.rate_limit.max_requests = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = valid_config();
        config.rate_limit.time_window_ms = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_cache_capacity_fails() {
        let mut config = valid_config();
        config.cache.max_entries = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_huge_ttls_fail() {
        let mut config = valid_config();
        config.pipeline.search_ttl_secs = u64::MAX;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("pipeline.search_ttl_secs"));

        let mut config = valid_config();
        config.cache.default_ttl_secs = MAX_DURATION_SECS + 1;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.pipeline.analysis_ttl_secs = MAX_DURATION_SECS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_negative_weight_fails() {
        let mut config = valid_config();
        config.scorer.topic_weight = -0.1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_all_zero_weights_fails() {
        let mut config = valid_config();
        config.scorer.topic_weight = 0.0;
        config.scorer.expertise_weight = 0.0;
        config.scorer.style_weight = 0.0;
        config.scorer.audience_weight = 0.0;
        config.scorer.format_weight = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_min_score_out_of_range_fails() {
        let mut config = valid_config();
        config.scorer.min_score = 1.5;
        assert!(validate_config(&config).is_err());
    }
}
