use async_trait::async_trait;
use reqwest::{Client, Url};
use thiserror::Error;

use crate::config::ApiConfig;

/// Status and body of a completed HTTP exchange, success or not.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// GET against the events API. `path` lists the segments below the API base
/// URL; each one is sent as a single, encoded path segment.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &[&str], query: &[(&str, String)]) -> Result<HttpResponse, TransportError>;
}

/// Production transport over a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL plus `path`, percent-encoding `/`, spaces and the like
    /// inside each segment.
    pub fn endpoint(&self, path: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &[&str], query: &[(&str, String)]) -> Result<HttpResponse, TransportError> {
        let url = self.endpoint(path)?;

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError(describe(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(describe(&e)))?;
        Ok(HttpResponse { status, body })
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("could not connect: {e}")
    } else {
        e.to_string()
    }
}
