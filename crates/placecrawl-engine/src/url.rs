//! Canonicalization of user-provided URL strings.

use reqwest::Url;

use crate::error::CrawlError;

/// Normalizes a raw user-supplied URL into a well-formed absolute [`Url`].
///
/// Input is trimmed; anything without an explicit `http://` or `https://`
/// scheme (including `www.`-prefixed and bare-host strings) gets `https://`
/// prepended before parsing.
///
/// # Errors
///
/// Returns [`CrawlError::InvalidInput`] when the trimmed input is empty or
/// the parsed URL has no host.
pub fn normalize_url(raw: &str) -> Result<Url, CrawlError> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        return Err(CrawlError::InvalidInput("URL cannot be empty".to_string()));
    }

    let with_scheme;
    let to_parse = if candidate.starts_with("http://") || candidate.starts_with("https://") {
        candidate
    } else {
        with_scheme = format!("https://{candidate}");
        &with_scheme
    };

    let parsed = Url::parse(to_parse)
        .map_err(|_| CrawlError::InvalidInput(format!("Invalid URL provided: {raw}")))?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(CrawlError::InvalidInput(format!(
            "Invalid URL provided: {raw}"
        )));
    }

    Ok(parsed)
}
