// src/fetch/mod.rs
//! Source fetchers. Each one resolves an identifier to raw items for a single
//! source and never returns an error to the caller: every failure collapses
//! into [`FetchResult::not_found`] after being logged.
//!
//! All network access goes through [`HttpTransport`], so fallback chains can
//! be exercised against scripted responses.

pub mod credentials;
pub mod github;
pub mod news;
pub mod reddit;
pub mod twitter;
pub mod twitter_cache;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::analyze::Source;

/// Raw items for one source plus where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<I, P = ()> {
    pub items: Vec<I>,
    pub found: bool,
    /// Which endpoint in the fallback chain produced the items.
    pub origin: Option<String>,
    pub profile: Option<P>,
}

impl<I, P> FetchResult<I, P> {
    pub fn found(items: Vec<I>, origin: impl Into<String>) -> Self {
        Self {
            items,
            found: true,
            origin: Some(origin.into()),
            profile: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            items: Vec::new(),
            found: false,
            origin: None,
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<P>) -> Self {
        self.profile = profile;
        self
    }
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    type Item: Send;
    type Profile: Send;

    fn source(&self) -> Source;

    /// Infallible by contract: failures surface as `found == false`.
    async fn fetch(&self, identifier: &str) -> FetchResult<Self::Item, Self::Profile>;
}

// ------------------------------------------------------------
// Transport
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<(String, String)>,
    pub form: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            basic_auth: None,
            form: Vec::new(),
            json: None,
            timeout: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    pub fn basic_auth(mut self, user: &str, password: &str) -> Self {
        self.basic_auth = Some((user.to_string(), password.to_string()));
        self
    }

    pub fn form(mut self, pairs: &[(&str, &str)]) -> Self {
        self.form = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A response as the fetchers see it. Redirects are NOT followed by the
/// transport; `location` carries the target when the status is 3xx.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status) && self.location.is_some()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).context("decoding json body")
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Transport-level failures (DNS, connect, timeout) are `Err`;
    /// any HTTP status is `Ok`.
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse>;
}

/// Production transport on top of `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        let mut rb = match req.method {
            Method::Get => self.client.get(&req.url),
            Method::Post => self.client.post(&req.url),
        };
        for (k, v) in &req.headers {
            rb = rb.header(k.as_str(), v.as_str());
        }
        if let Some((user, pass)) = &req.basic_auth {
            rb = rb.basic_auth(user, Some(pass));
        }
        if !req.form.is_empty() {
            rb = rb.form(&req.form);
        }
        if let Some(body) = &req.json {
            rb = rb.json(body);
        }
        if let Some(t) = req.timeout {
            rb = rb.timeout(t);
        }

        let resp = rb
            .send()
            .await
            .with_context(|| format!("{:?} {}", req.method, req.url))?;
        let status = resp.status().as_u16();
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await.context("reading response body")?;
        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}

/// Percent-encode a value for use as a single path segment or query value.
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
