use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to (`BIND_ADDR`).
    pub bind_addr: String,

    /// Externally reachable base URL of this service (`PUBLIC_BASE_URL`).
    /// The headless browser navigates here to reach its own preview page.
    pub public_base_url: String,

    /// Render requests allowed per client address per minute
    /// (`RATE_LIMIT_PER_MINUTE`).
    pub rate_limit_per_minute: u32,

    /// Directory holding the prebuilt preview bundle (`PREVIEW_DIR`).
    pub preview_dir: PathBuf,

    /// Bounded wait for a populated `<svg>` on the preview page
    /// (`ELEMENT_TIMEOUT_SECS`).
    pub element_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults (with a warning) on unset or unparseable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            rate_limit_per_minute: env_parsed("RATE_LIMIT_PER_MINUTE")
                .unwrap_or(defaults.rate_limit_per_minute),
            preview_dir: std::env::var("PREVIEW_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.preview_dir),
            element_timeout: env_parsed::<u64>("ELEMENT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.element_timeout),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            public_base_url: "http://127.0.0.1:3000".to_string(),
            rate_limit_per_minute: 10,
            preview_dir: PathBuf::from("preview/dist"),
            element_timeout: Duration::from_secs(10),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Unparseable env var, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.rate_limit_per_minute, 10);
        assert_eq!(config.preview_dir, PathBuf::from("preview/dist"));
        assert_eq!(config.element_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_env_parsed_missing_is_none() {
        assert_eq!(env_parsed::<u32>("GLYPHSNAP_TEST_UNSET_VAR"), None);
    }
}
