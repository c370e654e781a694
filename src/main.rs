//! Naughty-or-Nice service: binary entrypoint.
//! Boots the Axum HTTP server with the analysis pipeline, the assistant and `/metrics`.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use naughty_or_nice::api::{self, AppState};
use naughty_or_nice::config::AppConfig;
use naughty_or_nice::fetch::ReqwestTransport;
use naughty_or_nice::metrics::Metrics;

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
/// A subscriber installed by the runtime takes precedence.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("naughty_or_nice=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load()?;
    let transport = Arc::new(ReqwestTransport::new(&cfg.user_agent)?);
    let metrics = Metrics::init()?;

    info!(
        target: "api",
        mirrors = cfg.twitter.mirrors.len(),
        search_api = cfg.twitter.bearer_token.is_some(),
        reddit = cfg.reddit.client_id.is_some(),
        assistant = cfg.assistant.api_key.is_some(),
        "starting naughty-or-nice"
    );

    let state = AppState::new(&cfg, transport);
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
