use crate::app_config::AppConfig;
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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    // Required vars accept a legacy fallback name so deployments configured
    // for the original service keep working unchanged.
    let require_either = |var: &str, fallback: &str| -> Result<String, ConfigError> {
        lookup(var)
            .or_else(|_| lookup(fallback))
            .map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let or_fallback_or_default = |var: &str, fallback: &str, default: &str| -> String {
        lookup(var)
            .or_else(|_| lookup(fallback))
            .unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
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

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: format!("expected a boolean, got \"{other}\""),
                }),
            },
        }
    };

    let app_api_key = require_either("PLACECRAWL_APP_API_KEY", "APP_API_KEY")?;
    let llm_api_key = require_either("PLACECRAWL_LLM_API_KEY", "OPENAI_API_KEY")?;

    let llm_provider = or_default("PLACECRAWL_LLM_PROVIDER", "openai/gpt-4o-mini");
    let log_level = or_fallback_or_default("PLACECRAWL_LOG_LEVEL", "LOG_LEVEL", "info");
    let browser_headless = parse_bool("PLACECRAWL_BROWSER_HEADLESS", true)?;
    let request_timeout_seconds = parse_u64("PLACECRAWL_TIMEOUT_SECONDS", "180")?;
    let max_retries = parse_u32("PLACECRAWL_MAX_RETRIES", "2")?;
    let bind_addr = parse_addr("PLACECRAWL_BIND_ADDR", "0.0.0.0:8000")?;

    Ok(AppConfig {
        app_api_key,
        llm_api_key,
        llm_provider,
        log_level,
        browser_headless,
        request_timeout_seconds,
        max_retries,
        bind_addr,
    })
}
