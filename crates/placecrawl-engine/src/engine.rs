//! The black-box crawl capability: fetch a page, extract a place via an LLM.
//!
//! [`CrawlEngine`] is the seam the orchestrator drives; [`LlmEngine`] is the
//! production implementation. It holds a lazily-initialized HTTP handle with
//! an explicit `start`/`shutdown` lifecycle so the composition root owns the
//! resource and tests can swap in scripted engines.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::error::CrawlError;
use crate::text::page_text;
use crate::types::{EXTRACTION_INSTRUCTION, EXTRACTION_SCHEMA};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";
const USER_AGENT: &str = "placecrawl/0.1 (place-extraction)";

/// Per-run crawl configuration built by the orchestrator for each request.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Every crawl is fresh; caching is always bypassed.
    pub bypass_cache: bool,
    /// Bound on each long-latency operation within one attempt.
    pub page_timeout: Duration,
    pub instruction: &'static str,
    pub schema: &'static Value,
}

impl RunConfig {
    #[must_use]
    pub fn new(page_timeout_secs: u64) -> Self {
        Self {
            bypass_cache: true,
            page_timeout: Duration::from_secs(page_timeout_secs),
            instruction: EXTRACTION_INSTRUCTION,
            schema: &EXTRACTION_SCHEMA,
        }
    }
}

/// What one engine run produces: the raw page plus the extraction output.
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    pub html: String,
    /// JSON text the extraction produced; untrusted, may be absent or malformed.
    pub extracted_content: Option<String>,
}

/// Black-box crawl capability: given a normalized URL and a run
/// configuration, produce raw HTML plus extracted content, or fail.
#[async_trait]
pub trait CrawlEngine: Send + Sync {
    /// Initializes the engine handle. Must be idempotent; concurrent callers
    /// observing an absent handle must not double-initialize.
    async fn start(&self) -> Result<(), CrawlError>;

    /// Tears down the engine handle. Safe to call when already stopped.
    async fn shutdown(&self) -> Result<(), CrawlError>;

    /// Executes one crawl/extraction run against `url`.
    async fn execute(&self, url: &Url, run: &RunConfig) -> Result<CrawlOutput, CrawlError>;
}

/// Settings for the production [`LlmEngine`].
#[derive(Clone)]
pub struct EngineConfig {
    pub llm_api_key: String,
    /// Provider/model identifier, e.g. `openai/gpt-4o-mini`.
    pub llm_provider: String,
    /// Carried from the original browser-based engine; recorded at startup.
    pub headless: bool,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("llm_api_key", &"[redacted]")
            .field("llm_provider", &self.llm_provider)
            .field("headless", &self.headless)
            .finish()
    }
}

/// Production crawl engine: fetches the page over HTTP, reduces it to text,
/// and asks an OpenAI-compatible chat-completions endpoint to fill the
/// extraction schema.
#[derive(Debug)]
pub struct LlmEngine {
    config: EngineConfig,
    llm_base: Url,
    model: String,
    handle: RwLock<Option<Client>>,
}

impl LlmEngine {
    /// Creates an engine pointed at the provider named in
    /// `config.llm_provider`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Engine`] if the provider identifier is not
    /// `provider/model`-shaped or names an unsupported provider.
    pub fn new(config: EngineConfig) -> Result<Self, CrawlError> {
        let (provider, _) = split_provider(&config.llm_provider)?;
        let base = match provider {
            "openai" => OPENAI_BASE_URL,
            other => {
                return Err(CrawlError::Engine(format!(
                    "unsupported LLM provider \"{other}\""
                )))
            }
        };
        Self::with_llm_base_url(config, base)
    }

    /// Creates an engine with a custom chat-completions base URL (for testing
    /// with wiremock). Any provider prefix is accepted here.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Engine`] if the provider identifier or base URL
    /// is malformed.
    pub fn with_llm_base_url(config: EngineConfig, base_url: &str) -> Result<Self, CrawlError> {
        let (_, model) = split_provider(&config.llm_provider)?;
        let model = model.to_owned();

        // Ensure exactly one trailing slash so Url::join appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let llm_base = Url::parse(&normalised)
            .map_err(|e| CrawlError::Engine(format!("invalid LLM base URL '{base_url}': {e}")))?;

        Ok(Self {
            config,
            llm_base,
            model,
            handle: RwLock::new(None),
        })
    }

    /// Returns the shared HTTP client, starting the engine first if needed.
    async fn ensure_started(&self) -> Result<Client, CrawlError> {
        if let Some(client) = self.handle.read().await.as_ref() {
            return Ok(client.clone());
        }
        self.start().await?;
        self.handle
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or_else(|| CrawlError::Engine("engine handle unavailable after start".to_string()))
    }

    fn chat_endpoint(&self) -> Result<Url, CrawlError> {
        self.llm_base
            .join("chat/completions")
            .map_err(|e| CrawlError::Engine(format!("invalid chat endpoint: {e}")))
    }

    async fn fetch_page(
        &self,
        client: &Client,
        url: &Url,
        run: &RunConfig,
    ) -> Result<String, CrawlError> {
        let mut request = client.get(url.clone()).timeout(run.page_timeout);
        if run.bypass_cache {
            request = request.header(header::CACHE_CONTROL, "no-cache");
        }
        let response = request.send().await?.error_for_status()?;
        let html = response.text().await?;
        tracing::debug!(url = %url, bytes = html.len(), "page fetched");
        Ok(html)
    }

    async fn extract(
        &self,
        client: &Client,
        html: &str,
        run: &RunConfig,
    ) -> Result<Option<String>, CrawlError> {
        let system = format!(
            "{}\nReturn a single JSON object matching this schema: {}",
            run.instruction, run.schema
        );
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": page_text(html) },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0,
        });

        let endpoint = self.chat_endpoint()?;
        let response = client
            .post(endpoint.clone())
            .bearer_auth(&self.config.llm_api_key)
            .timeout(run.page_timeout)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        let completion: ChatCompletion =
            serde_json::from_str(&text).map_err(|e| CrawlError::Deserialize {
                context: endpoint.to_string(),
                source: e,
            })?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

#[async_trait]
impl CrawlEngine for LlmEngine {
    async fn start(&self) -> Result<(), CrawlError> {
        let mut handle = self.handle.write().await;
        if handle.is_some() {
            return Ok(());
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        *handle = Some(client);
        tracing::info!(
            provider = %self.config.llm_provider,
            headless = self.config.headless,
            "extraction engine ready"
        );
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), CrawlError> {
        let mut handle = self.handle.write().await;
        if handle.take().is_some() {
            tracing::info!("extraction engine stopped");
        }
        Ok(())
    }

    async fn execute(&self, url: &Url, run: &RunConfig) -> Result<CrawlOutput, CrawlError> {
        let client = self.ensure_started().await?;
        let html = self.fetch_page(&client, url, run).await?;
        let extracted_content = self.extract(&client, &html, run).await?;
        Ok(CrawlOutput {
            html,
            extracted_content,
        })
    }
}

/// Splits a `provider/model` identifier into its two halves.
fn split_provider(identifier: &str) -> Result<(&str, &str), CrawlError> {
    match identifier.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
            Ok((provider, model))
        }
        _ => Err(CrawlError::Engine(format!(
            "LLM provider must be \"provider/model\", got \"{identifier}\""
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
