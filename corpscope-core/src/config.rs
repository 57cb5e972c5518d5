//! Centralized configuration for Corpscope.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Central configuration for all Corpscope components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct CorpscopeConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Company registry dataset settings
    pub registry: RegistryConfig,
    /// Financial-disclosure API settings
    pub disclosure: DisclosureConfig,
    /// Generative-AI API settings
    pub generative: GenerativeConfig,
    /// News feed settings
    pub news: NewsConfig,
    /// Retry policy for upstream HTTP calls
    pub retry: RetryPolicy,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, all interfaces by default
    pub bind_addr: &'static str,
    /// Listening port
    pub port: u16,
    /// Path of the static front-end page served at `/`
    pub index_page: PathBuf,
    /// Directory of additional static assets served under `/static`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0",
            port: 5000,
            index_page: PathBuf::from("static/index.html"),
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Company registry dataset configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Location of the bulk XML dataset. A missing file degrades lookups
    /// to always-miss instead of failing startup.
    pub dataset_path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("CORPCODE.xml"),
        }
    }
}

/// Financial-disclosure API configuration.
#[derive(Debug, Clone)]
pub struct DisclosureConfig {
    /// Base URL of the disclosure API
    pub base_url: String,
    /// API key; `None` disables outbound calls entirely
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for DisclosureConfig {
    fn default() -> Self {
        Self {
            base_url: "https://opendart.fss.or.kr/api".to_string(),
            api_key: None,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Generative-AI API configuration.
#[derive(Debug, Clone)]
pub struct GenerativeConfig {
    /// Base URL of the model endpoint family
    pub base_url: String,
    /// API key; `None` disables outbound calls entirely
    pub api_key: Option<String>,
    /// Model identifier appended to the base URL
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Sampling temperature
    pub temperature: f64,
    /// Output token cap
    pub max_output_tokens: u32,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            api_key: None,
            model: "gemini-2.5-flash-preview-09-2025".to_string(),
            timeout: Duration::from_secs(60),
            temperature: 0.4,
            max_output_tokens: 4096,
        }
    }
}

/// News feed configuration.
///
/// Locale parameters target the Korean edition of the feed.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// Base URL of the RSS search feed
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Number of leading feed items to keep
    pub max_items: usize,
    /// Feed language parameter (`hl`)
    pub language: &'static str,
    /// Feed region parameter (`gl`)
    pub region: &'static str,
    /// Feed edition parameter (`ceid`)
    pub edition: &'static str,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://news.google.com/rss/search".to_string(),
            timeout: Duration::from_secs(5),
            max_items: 5,
            language: "ko",
            region: "KR",
            edition: "KR:ko",
        }
    }
}

/// Retry policy for upstream HTTP calls.
///
/// Attached to the shared transport as an explicit value rather than
/// ambient state, so tests can substitute a no-retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
    /// Exponential backoff factor, in seconds
    pub backoff_factor: f64,
    /// Status codes that trigger a retry
    pub retry_statuses: &'static [u16],
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.5,
            retry_statuses: &[429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries, for tests and latency-sensitive callers.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Whether the given HTTP status code should trigger a retry.
    pub fn is_retryable(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Backoff delay before the given retry attempt (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(self.backoff_factor.powi(attempt as i32))
    }
}

impl CorpscopeConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults. Unset or empty API keys leave the
    /// corresponding client disabled.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        if let Some(key) = non_empty_var("DART_API_KEY") {
            config.disclosure.api_key = Some(key);
        }

        if let Some(key) = non_empty_var("GEMINI_API_KEY") {
            config.generative.api_key = Some(key);
        }

        if let Some(model) = non_empty_var("GEMINI_MODEL") {
            config.generative.model = model;
        }

        if let Some(path) = non_empty_var("CORPSCOPE_DATASET") {
            config.registry.dataset_path = PathBuf::from(path);
        }

        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = CorpscopeConfig::default();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.disclosure.timeout, Duration::from_secs(15));
        assert_eq!(config.generative.timeout, Duration::from_secs(60));
        assert_eq!(config.news.timeout, Duration::from_secs(5));
        assert_eq!(config.news.max_items, 5);
        assert!(config.disclosure.api_key.is_none());
        assert!(config.generative.api_key.is_none());
    }

    #[test]
    fn test_retry_policy_statuses() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_retries, 3);
        for status in [429, 500, 502, 503, 504] {
            assert!(policy.is_retryable(status));
        }
        for status in [200, 201, 400, 401, 404, 501] {
            assert!(!policy.is_retryable(status));
        }
    }

    #[test]
    fn test_retry_backoff_grows_exponentially() {
        let policy = RetryPolicy::default();

        let first = policy.backoff_delay(1);
        let second = policy.backoff_delay(2);
        let third = policy.backoff_delay(3);

        assert_eq!(first, Duration::from_secs_f64(1.5));
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("PORT", "8080");
            std::env::set_var("DART_API_KEY", "dart-key");
            std::env::set_var("GEMINI_API_KEY", "  ");
            std::env::set_var("GEMINI_MODEL", "gemini-test-model");
        }

        let config = CorpscopeConfig::from_env();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.disclosure.api_key.as_deref(), Some("dart-key"));
        // Whitespace-only keys stay disabled
        assert!(config.generative.api_key.is_none());
        assert_eq!(config.generative.model, "gemini-test-model");

        unsafe {
            std::env::remove_var("PORT");
            std::env::remove_var("DART_API_KEY");
            std::env::remove_var("GEMINI_API_KEY");
            std::env::remove_var("GEMINI_MODEL");
        }
    }
}
