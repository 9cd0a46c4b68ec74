//! Minimal REST client shared by the provider adapters

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::errors::{GitProviderError, Result};

const USER_AGENT: &str = concat!("repolink/", env!("CARGO_PKG_VERSION"));

/// Authenticated JSON GET client bound to one API root
#[derive(Debug, Clone)]
pub(crate) struct RestClient {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl RestClient {
    /// `authorization` is the full header value, e.g. "token abc" or "Bearer abc"
    pub fn new(
        base_url: &str,
        authorization: Option<String>,
        accept: &'static str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        if let Some(authorization) = authorization {
            let mut value = HeaderValue::from_str(&authorization).map_err(|_| {
                GitProviderError::InvalidConfiguration(
                    "Token contains characters not allowed in an HTTP header".to_string(),
                )
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// GET `path` relative to the API root and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        debug!(path = %path, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitProviderError::from_status(
                status,
                &format!("GET {}", path),
                body,
            ));
        }

        Ok(response.json().await?)
    }
}

/// Query parameters for the single page every listing call fetches
pub(crate) fn first_page(size_param: &'static str) -> Vec<(&'static str, String)> {
    vec![
        ("page", super::types::LIST_PAGE.to_string()),
        (size_param, super::types::LIST_PAGE_SIZE.to_string()),
    ]
}

/// Percent-encode a single path segment
pub(crate) fn seg(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
