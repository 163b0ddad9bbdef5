use crate::prelude::*;
use std::time::Duration;

use nutriai_core::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Nutrition service settings
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: usize,
    pub debounce: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("NUTRIAI_API_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }

        if let Some(size) = lookup("NUTRIAI_PAGE_SIZE") {
            config.page_size = size
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    Error::Config(f!("NUTRIAI_PAGE_SIZE must be a positive number, got {size}"))
                })?;
        }

        if let Some(ms) = lookup("NUTRIAI_DEBOUNCE_MS") {
            let ms = ms.trim().parse::<u64>().map_err(|_| {
                Error::Config(f!("NUTRIAI_DEBOUNCE_MS must be a number of milliseconds, got {ms}"))
            })?;
            config.debounce = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Apply command line flags on top of the environment
    pub fn with_overrides(mut self, global: &crate::Global) -> Self {
        if let Some(url) = &global.api_url {
            self.base_url = url.clone();
        }
        if let Some(size) = global.page_size.filter(|s| *s > 0) {
            self.page_size = size;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.debounce, Duration::from_millis(500));
    }

    #[test]
    fn test_environment_values() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("NUTRIAI_API_URL", "https://nutri.example.test"),
            ("NUTRIAI_PAGE_SIZE", "50"),
            ("NUTRIAI_DEBOUNCE_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://nutri.example.test");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.debounce, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_environment_values() {
        assert!(ApiConfig::from_lookup(lookup(&[("NUTRIAI_PAGE_SIZE", "0")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("NUTRIAI_PAGE_SIZE", "many")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("NUTRIAI_DEBOUNCE_MS", "-1")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let global = crate::Global {
            api_url: Some("http://127.0.0.1:9000".to_string()),
            page_size: Some(5),
            verbose: false,
        };
        let config = ApiConfig::default().with_overrides(&global);

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.page_size, 5);
    }
}
