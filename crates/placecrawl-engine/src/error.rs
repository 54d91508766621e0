use thiserror::Error;

/// Error taxonomy for the crawl/extraction pipeline.
///
/// [`CrawlError::InvalidInput`] is the only variant callers should surface as
/// a client error; everything else is an upstream failure whose details stay
/// server-side.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("extraction engine error: {0}")]
    Engine(String),
}

impl CrawlError {
    /// Returns `true` for errors caused by bad caller input rather than
    /// upstream failure.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CrawlError::InvalidInput(_))
    }
}
