//! Scripted [`RestClient`] for exercising the real dialects.

use std::collections::HashMap;

use a1pms_client::{A1Error, A1Result, RestClient};
use async_trait::async_trait;
use parking_lot::Mutex;

/// One request seen by [`MockRestClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
    pub credentials: Option<(String, String)>,
}

/// Answers `(method, url)` pairs from a script and records every request.
/// Unscripted requests get a 404.
#[derive(Debug, Default)]
pub struct MockRestClient {
    responses: Mutex<HashMap<(&'static str, String), A1Result<String>>>,
    calls: Mutex<Vec<RestCall>>,
}

impl MockRestClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &'static str, url: impl Into<String>, response: A1Result<String>) {
        self.responses.lock().insert((method, url.into()), response);
    }

    pub fn ok(&self, method: &'static str, url: impl Into<String>, body: &str) {
        self.respond(method, url, Ok(body.to_string()));
    }

    pub fn calls(&self) -> Vec<RestCall> {
        self.calls.lock().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.url.clone()).collect()
    }

    fn answer(
        &self,
        method: &'static str,
        url: &str,
        body: Option<&str>,
        credentials: Option<(&str, &str)>,
    ) -> A1Result<String> {
        self.calls.lock().push(RestCall {
            method,
            url: url.to_string(),
            body: body.map(str::to_string),
            credentials: credentials.map(|(u, p)| (u.to_string(), p.to_string())),
        });
        self.responses
            .lock()
            .get(&(method, url.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(A1Error::RemoteRejected {
                    status: 404,
                    body: format!("no route for {method} {url}"),
                })
            })
    }
}

#[async_trait]
impl RestClient for MockRestClient {
    async fn get(&self, url: &str) -> A1Result<String> {
        self.answer("GET", url, None, None)
    }

    async fn put(&self, url: &str, body: &str) -> A1Result<String> {
        self.answer("PUT", url, Some(body), None)
    }

    async fn delete(&self, url: &str) -> A1Result<String> {
        self.answer("DELETE", url, None, None)
    }

    async fn post_with_auth(
        &self,
        url: &str,
        body: &str,
        username: &str,
        password: &str,
    ) -> A1Result<String> {
        self.answer("POST", url, Some(body), Some((username, password)))
    }
}
