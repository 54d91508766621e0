//! Crawl orchestration: URL normalization, single-flight execution, and the
//! retry loop with failure aggregation.
//!
//! [`PlaceCrawler`] drives a shared [`CrawlEngine`]. The engine invocation is
//! the only long-latency operation and is serialized through a single mutex,
//! so at most one page crawl/extraction executes at a time process-wide. This
//! bounds resource usage against an expensive and potentially unstable
//! upstream at the cost of serializing latency under load.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::engine::{CrawlEngine, RunConfig};
use crate::error::CrawlError;
use crate::normalize::to_place_result;
use crate::payload::parse_extracted;
use crate::types::PlaceResult;
use crate::url::normalize_url;

/// Orchestrator knobs, carried over from application config.
#[derive(Debug, Clone, Copy)]
pub struct CrawlerSettings {
    /// Bound on each individual crawl attempt, in seconds. There is no
    /// cross-attempt deadline; worst case is `(max_retries + 1)` timeouts.
    pub page_timeout_secs: u64,
    /// Additional attempts after the first before surfacing the last error.
    pub max_retries: u32,
}

/// Owns the crawl lifecycle for every inbound request.
pub struct PlaceCrawler {
    engine: Arc<dyn CrawlEngine>,
    run_lock: Mutex<()>,
    settings: CrawlerSettings,
}

impl PlaceCrawler {
    #[must_use]
    pub fn new(engine: Arc<dyn CrawlEngine>, settings: CrawlerSettings) -> Self {
        Self {
            engine,
            run_lock: Mutex::new(()),
            settings,
        }
    }

    /// Crawls `raw_url` and returns the normalized place result.
    ///
    /// Normalization failures propagate immediately and are never retried.
    /// Engine failures, malformed payloads, and payloads without a place name
    /// each consume one attempt; after `max_retries + 1` attempts the last
    /// observed error is surfaced unchanged.
    ///
    /// # Errors
    ///
    /// - [`CrawlError::InvalidInput`] for a bad URL, or when no place name
    ///   could be extracted by the final attempt.
    /// - Any other [`CrawlError`] the engine produced on the final attempt.
    pub async fn crawl(&self, raw_url: &str) -> Result<PlaceResult, CrawlError> {
        let url = normalize_url(raw_url)?;
        tracing::debug!(raw = raw_url, url = %url, "normalized crawl URL");

        self.engine.start().await?;
        let run = RunConfig::new(self.settings.page_timeout_secs);

        let attempts = self.settings.max_retries + 1;
        let mut last_error: Option<CrawlError> = None;
        for attempt in 1..=attempts {
            match self.attempt(&url, &run, attempt).await {
                Ok(result) => {
                    tracing::debug!(url = %url, attempt, place_name = %result.name, "crawl succeeded");
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "crawl attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CrawlError::Engine("no crawl attempts were made".to_string())))
    }

    /// One attempt: exclusive engine run, tolerant parse, name check,
    /// normalization.
    async fn attempt(
        &self,
        url: &reqwest::Url,
        run: &RunConfig,
        attempt: u32,
    ) -> Result<PlaceResult, CrawlError> {
        // Retries of one request never interleave with another request's
        // execution: the lock is held only around the engine invocation.
        let output = {
            let _guard = self.run_lock.lock().await;
            tracing::debug!(url = %url, attempt, "starting engine run");
            self.engine.execute(url, run).await?
        };
        tracing::debug!(url = %url, attempt, bytes = output.html.len(), "engine run completed");

        let extracted = parse_extracted(output.extracted_content.as_deref());
        if extracted.name().is_none() {
            return Err(CrawlError::InvalidInput(
                "extraction engine did not return a place name".to_string(),
            ));
        }
        Ok(to_place_result(&extracted))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Url;

    use super::*;
    use crate::engine::CrawlOutput;

    /// What a scripted engine should do on a given attempt.
    #[derive(Debug, Clone)]
    enum Step {
        Fail(&'static str),
        Content(&'static str),
        NoContent,
    }

    /// Engine that replays a fixed script and records call/concurrency stats.
    struct ScriptedEngine {
        script: StdMutex<Vec<Step>>,
        calls: AtomicU32,
        starts: AtomicU32,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedEngine {
        fn new(script: Vec<Step>) -> Self {
            Self {
                script: StdMutex::new(script),
                calls: AtomicU32::new(0),
                starts: AtomicU32::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn step_for(&self, call: u32) -> Step {
            let script = self.script.lock().expect("script lock");
            let idx = usize::try_from(call).expect("call index") - 1;
            script
                .get(idx)
                .or_else(|| script.last())
                .cloned()
                .unwrap_or(Step::NoContent)
        }
    }

    #[async_trait]
    impl CrawlEngine for ScriptedEngine {
        async fn start(&self) -> Result<(), CrawlError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn shutdown(&self) -> Result<(), CrawlError> {
            Ok(())
        }

        async fn execute(&self, _url: &Url, _run: &RunConfig) -> Result<CrawlOutput, CrawlError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            // Yield long enough for overlapping executions to be observable.
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.step_for(call) {
                Step::Fail(msg) => Err(CrawlError::Engine(msg.to_string())),
                Step::Content(body) => Ok(CrawlOutput {
                    html: "<html></html>".to_string(),
                    extracted_content: Some(body.to_string()),
                }),
                Step::NoContent => Ok(CrawlOutput {
                    html: "<html></html>".to_string(),
                    extracted_content: None,
                }),
            }
        }
    }

    fn crawler(engine: Arc<ScriptedEngine>, max_retries: u32) -> PlaceCrawler {
        PlaceCrawler::new(
            engine,
            CrawlerSettings {
                page_timeout_secs: 5,
                max_retries,
            },
        )
    }

    const VALID_PLACE: &str = r#"{"name": "Blue Door Cafe", "address": "12 High St", "category": "cafe"}"#;

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let engine = Arc::new(ScriptedEngine::new(vec![Step::Content(VALID_PLACE)]));
        let result = crawler(Arc::clone(&engine), 2)
            .crawl("example.com")
            .await
            .expect("crawl should succeed");
        assert_eq!(result.name, "Blue Door Cafe");
        assert_eq!(result.formatted_address.as_deref(), Some("12 High St"));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_engine_failures_then_succeeds() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            Step::Fail("boom"),
            Step::Fail("boom"),
            Step::Content(VALID_PLACE),
        ]));
        let result = crawler(Arc::clone(&engine), 2)
            .crawl("example.com")
            .await
            .expect("third attempt should succeed");
        assert_eq!(result.name, "Blue Door Cafe");
        assert_eq!(
            engine.calls.load(Ordering::SeqCst),
            3,
            "exactly 3 attempts expected"
        );
    }

    #[tokio::test]
    async fn empty_payload_exhausts_retries_as_invalid_input() {
        let engine = Arc::new(ScriptedEngine::new(vec![Step::NoContent]));
        let err = crawler(Arc::clone(&engine), 1)
            .crawl("example.com")
            .await
            .unwrap_err();
        assert!(err.is_invalid_input(), "expected InvalidInput, got: {err}");
        assert_eq!(
            engine.calls.load(Ordering::SeqCst),
            2,
            "max_retries 1 means exactly 2 attempts"
        );
    }

    #[tokio::test]
    async fn malformed_payload_consumes_attempts_without_crashing() {
        let engine = Arc::new(ScriptedEngine::new(vec![Step::Content("{not json")]));
        let err = crawler(Arc::clone(&engine), 1)
            .crawl("example.com")
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn last_engine_error_is_surfaced_after_exhaustion() {
        let engine = Arc::new(ScriptedEngine::new(vec![
            Step::Fail("first failure"),
            Step::Fail("final failure"),
        ]));
        let err = crawler(Arc::clone(&engine), 1)
            .crawl("example.com")
            .await
            .unwrap_err();
        assert!(
            matches!(err, CrawlError::Engine(ref msg) if msg == "final failure"),
            "expected the last error, got: {err}"
        );
    }

    #[tokio::test]
    async fn invalid_url_fails_fast_without_any_attempt() {
        let engine = Arc::new(ScriptedEngine::new(vec![Step::Content(VALID_PLACE)]));
        let err = crawler(Arc::clone(&engine), 2).crawl("   ").await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(
            engine.calls.load(Ordering::SeqCst),
            0,
            "URL errors are never retried"
        );
        assert_eq!(
            engine.starts.load(Ordering::SeqCst),
            0,
            "engine should not start for invalid input"
        );
    }

    #[tokio::test]
    async fn engine_is_started_before_attempts() {
        let engine = Arc::new(ScriptedEngine::new(vec![Step::Content(VALID_PLACE)]));
        crawler(Arc::clone(&engine), 0)
            .crawl("example.com")
            .await
            .expect("crawl should succeed");
        assert_eq!(engine.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_crawls_never_overlap_in_the_engine() {
        let engine = Arc::new(ScriptedEngine::new(vec![Step::Content(VALID_PLACE)]));
        let crawler = Arc::new(crawler(Arc::clone(&engine), 0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let crawler = Arc::clone(&crawler);
            handles.push(tokio::spawn(
                async move { crawler.crawl("example.com").await },
            ));
        }
        for handle in handles {
            handle
                .await
                .expect("task join")
                .expect("crawl should succeed");
        }

        assert_eq!(engine.calls.load(Ordering::SeqCst), 8);
        assert_eq!(
            engine.max_in_flight.load(Ordering::SeqCst),
            1,
            "engine executions must be serialized"
        );
    }
}
