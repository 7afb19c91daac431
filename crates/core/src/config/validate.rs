use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - At least one video extension is configured
/// - The filename template references `{Episode}`
/// - Max path length is not 0
/// - Keep-together substitution names both extensions
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.matching.video_extensions.is_empty() {
        return Err(ConfigError::ValidationError(
            "matching.video_extensions cannot be empty".to_string(),
        ));
    }

    if !config.naming.filename_template.contains("{Episode}") {
        return Err(ConfigError::ValidationError(
            "naming.filename_template must contain {Episode}".to_string(),
        ));
    }

    if config.naming.max_path_length == 0 {
        return Err(ConfigError::ValidationError(
            "naming.max_path_length cannot be 0".to_string(),
        ));
    }

    if let Some(sub) = &config.plan.keep_together_substitution {
        if sub.from.trim().is_empty() || sub.to.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "plan.keep_together_substitution needs both `from` and `to`".to_string(),
            ));
        }
    }

    Ok(())
}
