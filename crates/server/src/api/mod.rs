//! HTTP routing layer: one router constructor per entity group, composed
//! into the application router here.

pub mod auth;
pub mod dashboard;
pub mod drones;
pub mod error;
pub mod forms;
pub mod manufacturers;
pub mod pilots;
pub mod race_tracks;
pub mod state;

pub use auth::CurrentPilot;
pub use error::ApiError;
pub use state::AppState;

use axum::routing::get;
use axum::{Json, Router};
use racelink_api_types::{HealthCheckResponse, Page};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::repository::ListPage;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(health))
        .merge(auth::create_auth_router())
        .merge(pilots::create_pilot_router())
        .merge(manufacturers::create_manufacturer_router())
        .merge(drones::create_drone_router())
        .merge(race_tracks::create_race_track_router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}

/// Payload returned by the GET half of a delete route; the destructive POST
/// only runs after the caller has seen this.
#[derive(Debug, Serialize)]
pub(crate) struct DeleteConfirmation {
    pub id: String,
    pub display: String,
    pub detail: &'static str,
}

impl DeleteConfirmation {
    pub(crate) fn new(id: String, display: String) -> Self {
        Self {
            id,
            display,
            detail: "POST to this URL to permanently delete this record",
        }
    }
}

/// Payload returned by the GET half of a create or update route, naming the
/// fields the POST expects.
#[derive(Debug, Serialize)]
pub(crate) struct FormPrompt {
    pub detail: &'static str,
    pub fields: &'static [&'static str],
}

impl FormPrompt {
    pub(crate) fn new(fields: &'static [&'static str]) -> Self {
        Self {
            detail: "POST these urlencoded fields to this URL",
            fields,
        }
    }
}

pub(crate) fn none_if_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// An id that does not parse can never name a record, so it is a 404.
pub(crate) fn parse_id<T: std::str::FromStr>(
    raw: &str,
    entity: &'static str,
) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound { entity })
}

pub(crate) fn to_page<T, U>(page: ListPage<T>, f: impl FnMut(T) -> U) -> Page<U> {
    let page = page.map(f);
    Page {
        items: page.items,
        page: page.page,
        page_size: page.page_size,
        page_count: page.page_count,
        total: page.total,
    }
}

pub(crate) fn default_page() -> u64 {
    1
}
