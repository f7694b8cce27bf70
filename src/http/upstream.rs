//! Outbound API client used by the demo route.
//!
//! Forwards the request's correlation identifier so the called service can
//! join its logs to ours.

use std::time::Duration;

use axum::http::HeaderName;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

/// Summary of one upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body_len: usize,
}

/// Client for the configured upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    url: Url,
    header: HeaderName,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig, header: HeaderName) -> Result<Self, UpstreamError> {
        let url = Url::parse(&config.url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(UpstreamError::Client)?;
        Ok(Self {
            client,
            url,
            header,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// GET the upstream URL, propagating `correlation_id` when given.
    pub async fn fetch(&self, correlation_id: Option<&str>) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = self.client.get(self.url.clone());
        if let Some(id) = correlation_id {
            request = request.header(self.header.clone(), id);
        }

        let wrap = |source: reqwest::Error| UpstreamError::Request {
            url: self.url.clone(),
            source,
        };
        let response = request.send().await.map_err(wrap)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(wrap)?;

        Ok(UpstreamResponse {
            status,
            body_len: body.len(),
        })
    }
}
