//! HTTP transport used by every dialect
//!
//! Dialects talk to the network only through [`RestClient`], which keeps them
//! testable against scripted responses. [`HttpRestClient`] is the reqwest
//! implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::{A1Error, A1Result};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal HTTP verbs the A1 dialects need. Every method returns the response
/// body on a 2xx status and [`A1Error::RemoteRejected`] otherwise.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// `GET url`
    async fn get(&self, url: &str) -> A1Result<String>;

    /// `PUT url` with a JSON body
    async fn put(&self, url: &str, body: &str) -> A1Result<String>;

    /// `DELETE url`
    async fn delete(&self, url: &str) -> A1Result<String>;

    /// `POST url` with a JSON body and Basic auth
    async fn post_with_auth(
        &self,
        url: &str,
        body: &str,
        username: &str,
        password: &str,
    ) -> A1Result<String>;
}

/// reqwest-backed [`RestClient`].
#[derive(Debug, Clone)]
pub struct HttpRestClient {
    client: reqwest::Client,
}

impl HttpRestClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> A1Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| A1Error::transport("<client>", e))?;
        Ok(Self { client })
    }

    /// `PUT url` with a `text/plain` body.
    pub async fn put_text(&self, url: &str, body: &str) -> A1Result<String> {
        tracing::debug!(method = "PUT", url, "sending request");
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body.to_string());
        Self::send(request, url).await
    }

    async fn send(request: reqwest::RequestBuilder, url: &str) -> A1Result<String> {
        let response = request
            .send()
            .await
            .map_err(|e| A1Error::transport(url, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| A1Error::transport(url, e))?;

        if status.is_success() {
            tracing::trace!(url, status = status.as_u16(), "response received");
            Ok(body)
        } else {
            tracing::debug!(url, status = status.as_u16(), body = %body, "request rejected");
            Err(A1Error::RemoteRejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl RestClient for HttpRestClient {
    async fn get(&self, url: &str) -> A1Result<String> {
        tracing::debug!(method = "GET", url, "sending request");
        Self::send(self.client.get(url), url).await
    }

    async fn put(&self, url: &str, body: &str) -> A1Result<String> {
        tracing::debug!(method = "PUT", url, "sending request");
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        Self::send(request, url).await
    }

    async fn delete(&self, url: &str) -> A1Result<String> {
        tracing::debug!(method = "DELETE", url, "sending request");
        Self::send(self.client.delete(url), url).await
    }

    async fn post_with_auth(
        &self,
        url: &str,
        body: &str,
        username: &str,
        password: &str,
    ) -> A1Result<String> {
        tracing::debug!(method = "POST", url, "sending request");
        let request = self
            .client
            .post(url)
            .basic_auth(username, Some(password))
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        Self::send(request, url).await
    }
}
