use super::{types::Config, ConfigError, CHANNEL_PLACEHOLDER};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - URL prefix is set
/// - Argument and stream URL templates carry the channel placeholder
/// - Session intervals are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.url_prefix.is_empty() {
        return Err(ConfigError::ValidationError(
            "server.url_prefix cannot be empty".to_string(),
        ));
    }

    if !config.transcoder.args_template.contains(CHANNEL_PLACEHOLDER) {
        return Err(ConfigError::ValidationError(format!(
            "transcoder.args_template must contain {}",
            CHANNEL_PLACEHOLDER
        )));
    }

    if !config.tuner.stream_url_template().contains(CHANNEL_PLACEHOLDER) {
        return Err(ConfigError::ValidationError(format!(
            "tuner.stream_url must contain {}",
            CHANNEL_PLACEHOLDER
        )));
    }

    if config.session.readiness_poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "session.readiness_poll_interval_ms cannot be 0".to_string(),
        ));
    }

    if config.session.idle_check_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "session.idle_check_interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
