use rocket::http::{ContentType, Header, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{get, routes, Responder, Route, State};
use serde::Serialize;
use shelf_config::Config;
use shelf_sources::{feed_url_for, HttpTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct RelayState {
    transport: Arc<dyn HttpTransport>,
    url_template: String,
    cache_max_age_secs: u64,
    timeout: Duration,
}

impl RelayState {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        url_template: String,
        cache_max_age_secs: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            url_template,
            cache_max_age_secs,
            timeout,
        }
    }

    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            transport,
            config.feed.url_template.clone(),
            config.server.cache_max_age_secs,
            config.feed.timeout(),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type RelayError = status::Custom<Json<ErrorBody>>;

fn relay_error(status: Status, message: impl Into<String>) -> RelayError {
    status::Custom(status, Json(ErrorBody { error: message.into() }))
}

/// Upstream XML passed through untouched.
#[derive(Responder)]
pub struct FeedXml {
    body: String,
    content_type: ContentType,
    cache_control: Header<'static>,
}

impl FeedXml {
    fn new(body: String, max_age_secs: u64) -> Self {
        Self {
            body,
            content_type: ContentType::new("application", "xml"),
            cache_control: Header::new(
                "Cache-Control",
                format!("s-maxage={}, stale-while-revalidate", max_age_secs),
            ),
        }
    }
}

#[get("/rss?<username>")]
async fn rss(username: Option<&str>, state: &State<RelayState>) -> Result<FeedXml, RelayError> {
    let username = username.map(str::trim).unwrap_or_default();
    if username.is_empty() {
        return Err(relay_error(Status::BadRequest, "Username is required"));
    }

    let url = feed_url_for(&state.url_template, username);
    let response = match tokio::time::timeout(state.timeout, state.transport.get(&url)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!(username = %username, error = %e, "Relay fetch failed");
            return Err(relay_error(Status::InternalServerError, "Failed to fetch RSS feed"));
        }
        Err(_) => {
            warn!(username = %username, timeout = ?state.timeout, "Relay fetch timed out");
            return Err(relay_error(Status::InternalServerError, "Failed to fetch RSS feed"));
        }
    };

    if !response.is_success() {
        info!(username = %username, status = response.status, "Upstream refused feed");
        return Err(relay_error(
            Status::new(response.status),
            format!("Letterboxd returned {}", response.status),
        ));
    }

    info!(username = %username, bytes = response.body.len(), "Relayed feed");
    Ok(FeedXml::new(response.text().into_owned(), state.cache_max_age_secs))
}

pub fn routes() -> Vec<Route> {
    routes![rss]
}
