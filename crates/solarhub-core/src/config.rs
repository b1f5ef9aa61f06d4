use crate::app_config::{AppConfig, Environment, NewsFormat, NewsLocale};
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
/// Parsing and validation are decoupled from the real environment so tests can
/// drive them with a plain `HashMap`.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bounded_u32 =
        |var: &str, default: &str, min: u32, max: u32| -> Result<u32, ConfigError> {
            let value = or_default(var, default)
                .parse::<u32>()
                .map_err(|e| invalid(var, e.to_string()))?;
            if value < min || value > max {
                return Err(invalid(var, format!("must be between {min} and {max}")));
            }
            Ok(value)
        };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("SOLARHUB_ENV", "development"));
    let bind_addr = parse_addr("SOLARHUB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SOLARHUB_LOG_LEVEL", "info");
    let api_keys = parse_api_keys(&or_default("SOLARHUB_API_KEYS", ""));
    let youtube_api_key = lookup("YOUTUBE_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    let db_max_connections = parse_bounded_u32("SOLARHUB_DB_MAX_CONNECTIONS", "10", 1, 1_000)?;
    let db_min_connections = parse_bounded_u32("SOLARHUB_DB_MIN_CONNECTIONS", "1", 0, 1_000)?;
    let db_acquire_timeout_secs = parse_u64("SOLARHUB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let news_batch_size = parse_bounded_u32("SOLARHUB_NEWS_BATCH_SIZE", "7", 1, 1_000)?;
    let video_batch_size = parse_bounded_u32("SOLARHUB_VIDEO_BATCH_SIZE", "5", 1, 1_000)?;

    let news_format_raw = or_default("SOLARHUB_NEWS_FORMAT", "rss");
    let news_format = parse_news_format(&news_format_raw).ok_or_else(|| {
        invalid(
            "SOLARHUB_NEWS_FORMAT",
            format!("expected 'rss' or 'html', got '{news_format_raw}'"),
        )
    })?;
    let locale_default = NewsLocale::default();
    let news_locale = NewsLocale {
        hl: or_default("SOLARHUB_NEWS_HL", &locale_default.hl),
        gl: or_default("SOLARHUB_NEWS_GL", &locale_default.gl),
        ceid: or_default("SOLARHUB_NEWS_CEID", &locale_default.ceid),
    };

    let youtube_api_call_limit_per_brand = parse_bounded_u32(
        "SOLARHUB_YOUTUBE_API_CALL_LIMIT_PER_BRAND",
        "15",
        1,
        10_000,
    )?;
    let youtube_page_size = parse_bounded_u32("SOLARHUB_YOUTUBE_PAGE_SIZE", "50", 1, 50)?;

    let request_timeout_secs = parse_u64("SOLARHUB_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SOLARHUB_USER_AGENT", "solarhub/0.1 (content-ingest)");
    let http_max_retries = parse_bounded_u32("SOLARHUB_HTTP_MAX_RETRIES", "0", 0, 10)?;
    let http_retry_backoff_base_ms = parse_u64("SOLARHUB_HTTP_RETRY_BACKOFF_BASE_MS", "1000")?;
    let lease_ttl_secs = parse_u64("SOLARHUB_LEASE_TTL_SECS", "900")?;

    let news_cron = or_default("SOLARHUB_NEWS_CRON", "0 0 0 * * *");
    let video_cron = or_default("SOLARHUB_VIDEO_CRON", "0 30 0 * * *");
    let scheduler_enabled = parse_bool("SOLARHUB_SCHEDULER_ENABLED", "true")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        api_keys,
        youtube_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        news_batch_size,
        video_batch_size,
        news_format,
        news_locale,
        youtube_api_call_limit_per_brand,
        youtube_page_size,
        request_timeout_secs,
        user_agent,
        http_max_retries,
        http_retry_backoff_base_ms,
        lease_ttl_secs,
        news_cron,
        video_cron,
        scheduler_enabled,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_news_format(s: &str) -> Option<NewsFormat> {
    match s.trim().to_ascii_lowercase().as_str() {
        "rss" => Some(NewsFormat::Rss),
        "html" => Some(NewsFormat::Html),
        _ => None,
    }
}

fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
