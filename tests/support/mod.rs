// tests/support/mod.rs
//
// Shared fake transport for integration tests.
// Routes are matched by URL prefix, first registered wins. Every request is
// recorded in arrival order so fallback ordering can be asserted.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use naughty_or_nice::config::AppConfig;
use naughty_or_nice::fetch::{HttpRequest, HttpResponse, HttpTransport, Method};

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Redirect(u16, String),
    /// Transport-level failure (connect error, timeout).
    Fail(String),
}

pub fn ok(body: impl Into<String>) -> Reply {
    Reply::Status(200, body.into())
}

pub fn status(code: u16) -> Reply {
    Reply::Status(code, String::new())
}

pub fn redirect(location: &str) -> Reply {
    Reply::Redirect(302, location.to_string())
}

pub fn timeout() -> Reply {
    Reply::Fail("operation timed out".into())
}

struct Route {
    prefix: String,
    /// Replies are consumed in order; the last one repeats.
    replies: VecDeque<Reply>,
}

#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<Vec<Route>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(self: &Arc<Self>, prefix: &str, reply: Reply) -> Arc<Self> {
        self.route_seq(prefix, vec![reply])
    }

    pub fn route_seq(self: &Arc<Self>, prefix: &str, replies: Vec<Reply>) -> Arc<Self> {
        self.routes.lock().unwrap().push(Route {
            prefix: prefix.to_string(),
            replies: replies.into(),
        });
        self.clone()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.urls().iter().filter(|u| u.starts_with(prefix)).count()
    }

    pub fn posts_to(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == Method::Post && r.url.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, req: HttpRequest) -> anyhow::Result<HttpResponse> {
        let url = req.url.clone();
        self.log.lock().unwrap().push(req);

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            let route = routes.iter_mut().find(|r| url.starts_with(&r.prefix));
            match route {
                Some(r) if r.replies.len() > 1 => r.replies.pop_front(),
                Some(r) => r.replies.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Status(status, body)) => Ok(HttpResponse {
                status,
                location: None,
                body,
            }),
            Some(Reply::Redirect(status, location)) => Ok(HttpResponse {
                status,
                location: Some(location),
                body: String::new(),
            }),
            Some(Reply::Fail(msg)) => Err(anyhow::anyhow!(msg)),
            None => Err(anyhow::anyhow!("connection refused: {url}")),
        }
    }
}

pub const MIRROR_1: &str = "https://m1.test";
pub const MIRROR_2: &str = "https://m2.test";
pub const MIRROR_3: &str = "https://m3.test";
pub const SEARCH_API: &str = "https://api.x.test/2";
pub const REDDIT_TOKEN: &str = "https://reddit.test/api/v1/access_token";
pub const REDDIT_API: &str = "https://oauth.reddit.test";
pub const NEWS_SEARCH: &str = "https://news.test/html/";
pub const GITHUB_API: &str = "https://gh.test";
pub const LLM: &str = "https://llm.test/v1/chat/completions";

/// Config pointing every endpoint at the fake hosts above, without credentials.
pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.twitter.mirrors = vec![MIRROR_1.into(), MIRROR_2.into(), MIRROR_3.into()];
    cfg.twitter.search_api_base = SEARCH_API.into();
    cfg.reddit.token_url = REDDIT_TOKEN.into();
    cfg.reddit.api_base = REDDIT_API.into();
    cfg.news.search_url = NEWS_SEARCH.into();
    cfg.github.api_base = GITHUB_API.into();
    cfg.assistant.endpoint = LLM.into();
    cfg
}

pub fn with_reddit_credentials(mut cfg: AppConfig) -> AppConfig {
    cfg.reddit.client_id = Some("client".into());
    cfg.reddit.client_secret = Some("secret".into());
    cfg
}

pub fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}
