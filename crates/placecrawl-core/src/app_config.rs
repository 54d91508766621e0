use std::net::SocketAddr;

/// Runtime configuration for the placecrawl service.
///
/// Loaded once at startup from environment variables; see
/// [`crate::load_app_config`]. Both API keys are redacted from the `Debug`
/// output so the config can be logged safely.
#[derive(Clone)]
pub struct AppConfig {
    pub app_api_key: String,
    pub llm_api_key: String,
    pub llm_provider: String,
    pub log_level: String,
    pub browser_headless: bool,
    pub request_timeout_seconds: u64,
    pub max_retries: u32,
    pub bind_addr: SocketAddr,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_api_key", &"[redacted]")
            .field("llm_api_key", &"[redacted]")
            .field("llm_provider", &self.llm_provider)
            .field("log_level", &self.log_level)
            .field("browser_headless", &self.browser_headless)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
