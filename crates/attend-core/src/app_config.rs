#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Timing and retry policy for location acquisition, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSettings {
    pub max_attempts: u32,
    pub quick_fix_timeout_ms: u64,
    pub quick_fix_max_age_ms: u64,
    pub precise_fix_timeout_ms: u64,
    pub watch_max_age_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            quick_fix_timeout_ms: 5_000,
            quick_fix_max_age_ms: 60_000,
            precise_fix_timeout_ms: 30_000,
            watch_max_age_ms: 10_000,
            backoff_base_ms: 2_000,
            backoff_cap_ms: 10_000,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_max_retries: u32,
    pub http_retry_backoff_base_ms: u64,
    pub locator: LocatorSettings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field(
                "http_retry_backoff_base_ms",
                &self.http_retry_backoff_base_ms,
            )
            .field("locator", &self.locator)
            .finish()
    }
}
