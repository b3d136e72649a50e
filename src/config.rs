use serde::Deserialize;

pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub places_api_key: String,
    pub places_base_url: String,
    /// Per-request timeout for both search and detail calls.
    pub places_timeout_secs: u64,
    /// Wait before a continuation cursor is usable upstream.
    pub page_warmup_ms: u64,
    /// Optional per-query page cap. `None` follows cursors for as long as
    /// the upstream keeps returning them.
    pub max_pages_per_query: Option<usize>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            places_api_key: std::env::var("GOOGLE_PLACES_API_KEY")
                .map_err(|_| anyhow::anyhow!("GOOGLE_PLACES_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("GOOGLE_PLACES_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            places_base_url: std::env::var("PLACES_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PLACES_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            places_timeout_secs: std::env::var("PLACES_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PLACES_TIMEOUT_SECS must be a whole number of seconds"))?,
            page_warmup_ms: std::env::var("PLACES_PAGE_WARMUP_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PLACES_PAGE_WARMUP_MS must be a whole number of milliseconds"))?,
            max_pages_per_query: match std::env::var("PLACES_MAX_PAGES") {
                Ok(raw) if !raw.trim().is_empty() => {
                    let cap: usize = raw
                        .trim()
                        .parse()
                        .map_err(|_| anyhow::anyhow!("PLACES_MAX_PAGES must be a positive number"))?;
                    if cap == 0 {
                        anyhow::bail!("PLACES_MAX_PAGES must be at least 1");
                    }
                    Some(cap)
                }
                _ => None,
            },
        };

        config.validate()?;

        // Log successful configuration load (without the API key)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Places Base URL: {}", config.places_base_url);
        tracing::debug!(
            "Places timeout: {}s, page warm-up: {}ms, page cap: {:?}",
            config.places_timeout_secs,
            config.page_warmup_ms,
            config.max_pages_per_query
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.places_base_url.trim().is_empty() {
            anyhow::bail!("PLACES_BASE_URL cannot be empty");
        }
        if !self.places_base_url.starts_with("http://")
            && !self.places_base_url.starts_with("https://")
        {
            anyhow::bail!("PLACES_BASE_URL must start with http:// or https://");
        }
        if self.places_timeout_secs == 0 {
            anyhow::bail!("PLACES_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            port: 5000,
            places_api_key: "key".to_string(),
            places_base_url: DEFAULT_PLACES_BASE_URL.to_string(),
            places_timeout_secs: 15,
            page_warmup_ms: 2000,
            max_pages_per_query: None,
        }
    }

    #[test]
    fn test_default_base_url_is_valid() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = Config {
            places_base_url: "ftp://maps.example.com".to_string(),
            ..base_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = Config {
            places_timeout_secs: 0,
            ..base_config()
        };
        assert!(config.validate().is_err());
    }
}
