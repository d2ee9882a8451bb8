use crate::error::{Result, TabError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use std::time::Duration;

/// The page-fetch capability handed to every extraction call.
///
/// Tab pages render fine without JavaScript, so the default implementation is
/// a plain blocking HTTP client; tests substitute canned HTML fixtures.
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn fetch(&self, url: &str) -> Result<String>;
}

pub struct ReqwestFetcher {
    client: Client,
}

const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| TabError::Fetch {
                url: String::new(),
                reason: format!("client init: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for ReqwestFetcher {
    fn name(&self) -> &'static str {
        "reqwest-blocking"
    }

    fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| TabError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TabError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP status {status}"),
            });
        }
        resp.text().map_err(|e| TabError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
