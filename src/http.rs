use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Other(e.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// The outbound calls the app makes. `None` timeouts wait as long as the
/// server keeps the connection alive.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &Url, timeout: Option<Duration>) -> Result<HttpResponse, TransportError>;

    fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        bearer: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError>;
}

pub struct BlockingClient {
    inner: Client,
}

impl BlockingClient {
    pub fn new() -> Result<Self> {
        let inner = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Option::<Duration>::None)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { inner })
    }

    fn send(
        builder: RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError> {
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        let response = builder.send()?;
        let status = response.status();
        let body = response.bytes()?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpClient for BlockingClient {
    fn get(&self, url: &Url, timeout: Option<Duration>) -> Result<HttpResponse, TransportError> {
        log::debug!("GET {}", url);
        Self::send(self.inner.get(url.clone()), timeout)
    }

    fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        bearer: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError> {
        log::debug!("POST {} (auth: {})", url, bearer.is_some());
        let mut builder = self.inner.post(url.clone()).json(body);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        Self::send(builder, timeout)
    }
}
