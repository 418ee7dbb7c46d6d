//! Record sources: where strategy-details payloads come from.
//!
//! [`NapbotsClient`] fetches them over HTTP. Tests substitute their own
//! [`RecordSource`] so the retry and fan-out logic runs without a network.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA};
use thiserror::Error;
use tracing::debug;

use stratsheet_core::{RawEntityRecord, RecordEnvelope};

/// Strategy-details endpoint; the strategy code is appended.
pub const DETAILS_URL_PREFIX: &str = "https://middle.napbots.com/v1/strategy/details/";

/// Errors from a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} for '{name}'")]
    Status { name: String, status: u16 },

    #[error("response format changed: {0}")]
    Format(String),

    #[error("source reported failure for '{name}'")]
    Unsuccessful { name: String },

    #[error("unknown strategy '{name}'")]
    UnknownStrategy { name: String },
}

/// Anything that can produce one strategy's raw record.
pub trait RecordSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// One attempt at fetching `name` (upstream code `code`). No retries here.
    fn fetch(&self, name: &str, code: &str) -> Result<RawEntityRecord, FetchError>;
}

/// Blocking HTTP client for the strategy-details endpoint.
pub struct NapbotsClient {
    client: reqwest::blocking::Client,
    proxy: bool,
}

impl NapbotsClient {
    /// Build a client. With `proxy`, requests go through the page-translation
    /// host instead of the origin (see [`proxify`]).
    pub fn new(proxy: bool) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:91.0) Gecko/20100101 Firefox/91.0")
            .default_headers(browser_headers())
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client, proxy })
    }

    /// Request URL for a strategy code.
    pub fn details_url(&self, code: &str) -> String {
        let url = format!("{DETAILS_URL_PREFIX}{code}");
        if self.proxy {
            proxify(&url)
        } else {
            url
        }
    }
}

impl RecordSource for NapbotsClient {
    fn name(&self) -> &str {
        "napbots"
    }

    fn fetch(&self, name: &str, code: &str) -> Result<RawEntityRecord, FetchError> {
        let url = self.details_url(code);
        debug!(entity = name, %url, "requesting");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }

        let envelope: RecordEnvelope = resp
            .json()
            .map_err(|e| FetchError::Format(format!("'{name}': {e}")))?;
        envelope.into_record().ok_or_else(|| FetchError::Unsuccessful {
            name: name.to_string(),
        })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("cross-site"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Route a URL through the page-translation proxy: the host `a.b.c` becomes
/// `a-b-c.translate.goog`; scheme, path and query are kept.
///
/// Input without a `//` host part is returned unchanged.
pub fn proxify(url: &str) -> String {
    let Some(start) = url.find("//").map(|i| i + 2) else {
        return url.to_string();
    };
    let end = url[start..].find('/').map_or(url.len(), |i| start + i);
    let host = &url[start..end];
    if host.is_empty() {
        return url.to_string();
    }
    format!(
        "{}{}.translate.goog{}",
        &url[..start],
        host.replace('.', "-"),
        &url[end..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxify_rewrites_host_only() {
        assert_eq!(
            proxify("https://middle.napbots.com/v1/strategy/details/STRAT_X"),
            "https://middle-napbots-com.translate.goog/v1/strategy/details/STRAT_X"
        );
        assert_eq!(proxify("https://a.b"), "https://a-b.translate.goog");
        assert_eq!(proxify("no-host"), "no-host");
    }

    #[test]
    fn details_url_follows_proxy_flag() {
        let direct = NapbotsClient::new(false).unwrap();
        assert_eq!(
            direct.details_url("STRAT_BTC_USD_H_5"),
            "https://middle.napbots.com/v1/strategy/details/STRAT_BTC_USD_H_5"
        );
        let proxied = NapbotsClient::new(true).unwrap();
        assert!(proxied
            .details_url("STRAT_BTC_USD_H_5")
            .starts_with("https://middle-napbots-com.translate.goog/"));
    }
}
