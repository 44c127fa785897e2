use crate::app_config::{AppConfig, Environment, LocatorSettings};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let api_base_url = require("ATTEND_API_BASE_URL")?;
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "ATTEND_API_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{api_base_url}'"),
        });
    }
    let api_token = lookup("ATTEND_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let env = parse_environment(&or_default("ATTEND_ENV", "development"))?;
    let log_level = or_default("ATTEND_LOG_LEVEL", "info");

    let http_timeout_secs = parse_u64("ATTEND_HTTP_TIMEOUT_SECS", "30")?;
    let http_user_agent = or_default("ATTEND_HTTP_USER_AGENT", "attend/0.1 (attendance-kiosk)");
    let http_max_retries = parse_u32("ATTEND_HTTP_MAX_RETRIES", "2")?;
    let http_retry_backoff_base_ms = parse_u64("ATTEND_HTTP_RETRY_BACKOFF_BASE_MS", "500")?;

    let max_attempts = parse_u32("ATTEND_LOCATION_MAX_ATTEMPTS", "3")?;
    let quick_fix_timeout_ms = parse_u64("ATTEND_QUICK_FIX_TIMEOUT_MS", "5000")?;
    let quick_fix_max_age_ms = parse_u64("ATTEND_QUICK_FIX_MAX_AGE_MS", "60000")?;
    let precise_fix_timeout_ms = parse_u64("ATTEND_PRECISE_FIX_TIMEOUT_MS", "30000")?;
    let watch_max_age_ms = parse_u64("ATTEND_WATCH_MAX_AGE_MS", "10000")?;
    let backoff_base_ms = parse_u64("ATTEND_BACKOFF_BASE_MS", "2000")?;
    let backoff_cap_ms = parse_u64("ATTEND_BACKOFF_CAP_MS", "10000")?;
    if backoff_cap_ms < backoff_base_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "ATTEND_BACKOFF_CAP_MS".to_string(),
            reason: format!("cap {backoff_cap_ms} is below base {backoff_base_ms}"),
        });
    }

    Ok(AppConfig {
        api_base_url,
        api_token,
        env,
        log_level,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_retry_backoff_base_ms,
        locator: LocatorSettings {
            max_attempts,
            quick_fix_timeout_ms,
            quick_fix_max_age_ms,
            precise_fix_timeout_ms,
            watch_max_age_ms,
            backoff_base_ms,
            backoff_cap_ms,
        },
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ATTEND_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
