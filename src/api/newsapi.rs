use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::api::{ApiResponse, NewsApi};
use crate::app::{NewsdeskError, Result};
use crate::config::ApiConfig;
use crate::domain::NewsResponse;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Error body returned by newsapi.org on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct NewsApiClient {
    client: Client,
    base_url: Url,
    page_size: u32,
}

impl NewsApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|_| NewsdeskError::Config("API key contains invalid characters".into()))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent("newsdesk/0.1.0")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            page_size: config.page_size.max(1),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", base_path, path));
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    fn headlines_url(&self, country_code: &str, page: u32) -> Result<Url> {
        self.endpoint(
            "v2/top-headlines",
            &[
                ("country", country_code),
                ("page", &page.to_string()),
                ("pageSize", &self.page_size.to_string()),
            ],
        )
    }

    fn search_url(&self, query: &str, page: u32) -> Result<Url> {
        self.endpoint(
            "v2/everything",
            &[
                ("q", query),
                ("page", &page.to_string()),
                ("pageSize", &self.page_size.to_string()),
            ],
        )
    }

    async fn get(&self, url: Url) -> Result<ApiResponse> {
        tracing::debug!("GET {}", redact(&url));
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        parse_response(status, &body)
    }
}

/// Turn a raw status and body into an [`ApiResponse`].
pub(crate) fn parse_response(status: StatusCode, body: &[u8]) -> Result<ApiResponse> {
    if status.is_success() {
        let news: NewsResponse = serde_json::from_slice(body)?;
        return Ok(ApiResponse::Success(news));
    }

    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| status.canonical_reason().map(String::from))
        .filter(|m| !m.trim().is_empty());

    tracing::warn!("news api returned {}: {:?}", status.as_u16(), message);
    Ok(ApiResponse::Failure {
        status: status.as_u16(),
        message,
    })
}

fn redact(url: &Url) -> String {
    // The key travels as a header, but a user-supplied base url might carry one.
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "apiKey")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

#[async_trait]
impl NewsApi for NewsApiClient {
    async fn headlines(&self, country_code: &str, page: u32) -> Result<ApiResponse> {
        let url = self.headlines_url(country_code, page)?;
        self.get(url).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<ApiResponse> {
        let url = self.search_url(query, page)?;
        self.get(url).await
    }
}
