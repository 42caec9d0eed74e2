use crate::config::types::{
    Config, ExtractConfig, OutputConfig, PipelineConfig, SeedConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pipeline_config(&config.pipeline)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_seed_config(&config.seeds)?;
    validate_extract_config(&config.extract)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates worker counts and queue capacities
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.page_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "page_workers must be >= 1, got {}",
            config.page_workers
        )));
    }

    if config.item_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "item_workers must be >= 1, got {}",
            config.item_workers
        )));
    }

    for (name, capacity) in [
        ("page_queue_capacity", config.page_queue_capacity),
        ("link_queue_capacity", config.link_queue_capacity),
        ("record_queue_capacity", config.record_queue_capacity),
    ] {
        if capacity < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, capacity
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.scraper_name.is_empty() {
        return Err(ConfigError::Validation(
            "scraper_name cannot be empty".to_string(),
        ));
    }

    if !config
        .scraper_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "scraper_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.scraper_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates seed enumeration configuration
fn validate_seed_config(config: &SeedConfig) -> Result<(), ConfigError> {
    if !config.url_template.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "url_template must contain the '{{page}}' placeholder, got '{}'",
            config.url_template
        )));
    }

    // Expand one URL to make sure the template itself parses
    let sample = config.url_template.replace("{page}", "1");
    let url = Url::parse(&sample)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid url_template '{}': {}", sample, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "url_template must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.first_page > config.last_page {
        return Err(ConfigError::Validation(format!(
            "first_page ({}) must be <= last_page ({})",
            config.first_page, config.last_page
        )));
    }

    Ok(())
}

/// Validates that all configured CSS selectors parse
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("link_selector", &config.link_selector),
        ("title_selector", &config.title_selector),
        ("info_selector", &config.info_selector),
    ] {
        if Selector::parse(selector).is_err() {
            return Err(ConfigError::InvalidSelector(format!(
                "{} '{}' is not a valid CSS selector",
                name, selector
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
