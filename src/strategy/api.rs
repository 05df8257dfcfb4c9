use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use spider_client::shapes::request::{ReturnFormat, ReturnFormatHandling};
use spider_client::{RequestParams, Spider};

use super::ExtractionStrategy;
use crate::errors::ScrapeFailure;

// Anything shorter is an error stub, not a page.
const MIN_CONTENT_BYTES: usize = 100;

/// Remote extraction through the spider.cloud API, returning raw HTML.
pub struct ApiStrategy {
    api_key: String,
    timeout: Duration,
}

impl ApiStrategy {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self { api_key, timeout }
    }
}

/// Pull `content` out of a spider response, honouring its reported status.
fn read_response(value: Value) -> Result<String, ScrapeFailure> {
    let parsed: Value = match value.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or(value.clone()),
        None => value,
    };

    let first = parsed
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| ScrapeFailure::Api("empty response".into()))?;

    if let Some(status) = first.get("status").and_then(|s| s.as_u64()) {
        if let Some(failure) = ScrapeFailure::from_status(status as u16) {
            return Err(failure);
        }
    }
    if let Some(err) = first.get("error").and_then(|e| e.as_str()).filter(|e| !e.is_empty()) {
        return Err(ScrapeFailure::Api(err.to_string()));
    }

    let content = first
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default();
    if content.len() < MIN_CONTENT_BYTES {
        return Err(ScrapeFailure::Parse(format!(
            "invalid response: only {} bytes of content",
            content.len()
        )));
    }
    Ok(content.to_string())
}

#[async_trait]
impl ExtractionStrategy for ApiStrategy {
    fn name(&self) -> &'static str {
        "api"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &str) -> Result<String, ScrapeFailure> {
        let spider = Spider::new(Some(self.api_key.clone()))
            .map_err(|e| ScrapeFailure::Api(format!("client setup: {}", e)))?;

        let params = RequestParams {
            return_format: Some(ReturnFormatHandling::Single(ReturnFormat::Raw)),
            ..Default::default()
        };

        let response = spider
            .scrape_url(url, Some(params), "application/json")
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScrapeFailure::Timeout(self.timeout)
                } else if let Some(status) = e.status() {
                    ScrapeFailure::from_status(status.as_u16())
                        .unwrap_or_else(|| ScrapeFailure::Api(e.to_string()))
                } else {
                    ScrapeFailure::Network(format!("connection to extraction API failed: {}", e))
                }
            })?;

        read_response(response)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> String {
        format!("<html><body><h1>Apartamento T1</h1>{}</body></html>", "x".repeat(120))
    }

    #[test]
    fn content_is_returned() {
        let v = json!([{ "content": page(), "status": 200, "url": "https://x.pt" }]);
        assert_eq!(read_response(v).unwrap(), page());
    }

    #[test]
    fn string_wrapped_json_is_unwrapped() {
        let inner = json!([{ "content": page(), "status": 200 }]).to_string();
        assert_eq!(read_response(Value::String(inner)).unwrap(), page());
    }

    #[test]
    fn upstream_status_is_mapped() {
        let blocked = json!([{ "content": "", "status": 403 }]);
        assert_eq!(read_response(blocked).unwrap_err(), ScrapeFailure::Blocked);

        let limited = json!([{ "content": "", "status": 429 }]);
        assert_eq!(read_response(limited).unwrap_err(), ScrapeFailure::RateLimited);
    }

    #[test]
    fn short_content_is_a_parse_failure() {
        let v = json!([{ "content": "<html></html>", "status": 200 }]);
        assert!(matches!(read_response(v).unwrap_err(), ScrapeFailure::Parse(_)));
    }

    #[test]
    fn empty_array_is_an_api_failure() {
        assert!(matches!(read_response(json!([])).unwrap_err(), ScrapeFailure::Api(_)));
    }
}
