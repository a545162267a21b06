//! Same-origin relay for member feeds: `GET /api/rss?username=<name>`.
//!
//! Browsers cannot read the upstream feed directly, so this endpoint fetches
//! it server-side and hands the XML back with permissive CORS headers and a
//! shared-cache hint.

mod cors;
mod routes;

pub use cors::Cors;
pub use routes::{routes, ErrorBody, FeedXml, RelayState};

use rocket::{Build, Rocket};
use shelf_config::ServerConfig;

/// Rocket instance bound to the configured address with the relay mounted
/// under `/api`. Rocket's own logger is silenced; requests are traced.
pub fn build(server: &ServerConfig, state: RelayState) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", server.address.clone()))
        .merge(("port", server.port))
        .merge(("log_level", "off"));

    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .mount("/", cors::preflight_routes())
        .mount("/api", routes())
}
