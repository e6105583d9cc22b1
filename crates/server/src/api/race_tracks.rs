use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Form, Json, Router};
use racelink_api_types::Page;
use racelink_core::domain::RaceTrackId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::repository::{NewRaceTrack, PageRequest, RaceTrackRecord, UpdateRaceTrack};

use super::auth::CurrentPilot;
use super::error::ApiError;
use super::forms::{validate_race_track, RaceTrackForm};
use super::state::AppState;
use super::{none_if_empty, parse_id, to_page, DeleteConfirmation, FormPrompt};

pub fn create_race_track_router() -> Router<AppState> {
    Router::new()
        .route("/racetracks/", get(list_race_tracks))
        .route(
            "/racetracks/create/",
            get(race_track_form).post(create_race_track),
        )
        .route("/racetracks/{id}/", get(race_track_detail))
        .route(
            "/racetracks/{id}/update/",
            get(race_track_form).post(update_race_track),
        )
        .route(
            "/racetracks/{id}/delete/",
            get(confirm_delete_race_track).post(delete_race_track),
        )
}

#[derive(Debug, Deserialize)]
struct RaceTrackListQuery {
    #[serde(default = "super::default_page")]
    page: u64,
    /// Case-insensitive substring match on the name.
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
struct RaceTrackResponse {
    id: String,
    name: String,
    difficulty_level: i16,
    difficulty_label: &'static str,
    length_meters: i32,
    location: String,
    /// "HH:MM:SS", or null when no record has been set yet.
    record_time: Option<String>,
}

impl From<RaceTrackRecord> for RaceTrackResponse {
    fn from(record: RaceTrackRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            difficulty_level: record.difficulty.code(),
            difficulty_label: record.difficulty.label(),
            length_meters: record.length_meters,
            location: record.location,
            record_time: record.record_time.map(|t| t.to_string()),
        }
    }
}

async fn list_race_tracks(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Query(query): Query<RaceTrackListQuery>,
) -> Result<Json<Page<RaceTrackResponse>>, ApiError> {
    let page = state
        .race_tracks
        .list(
            none_if_empty(&query.name),
            PageRequest {
                page: query.page,
                page_size: state.page_size,
            },
        )
        .await?;

    Ok(Json(to_page(page, RaceTrackResponse::from)))
}

async fn race_track_detail(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RaceTrackResponse>, ApiError> {
    let track_id: RaceTrackId = parse_id(&id, "race track")?;
    let record = state
        .race_tracks
        .find_by_id(track_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "race track",
        })?;

    Ok(Json(record.into()))
}

async fn race_track_form(_pilot: CurrentPilot) -> Json<FormPrompt> {
    Json(FormPrompt::new(&[
        "name",
        "difficulty_level",
        "length_meters",
        "location",
        "record_time",
    ]))
}

async fn create_race_track(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Form(form): Form<RaceTrackForm>,
) -> Result<Redirect, ApiError> {
    let valid = validate_race_track(&form).map_err(ApiError::Validation)?;

    let record = state
        .race_tracks
        .create(NewRaceTrack {
            name: valid.name,
            difficulty: valid.difficulty,
            length_meters: valid.length_meters,
            location: valid.location,
            record_time: valid.record_time,
        })
        .await?;

    info!(track_id = %record.id, name = %record.name, "race track created");
    Ok(Redirect::to("/racetracks/"))
}

async fn update_race_track(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RaceTrackForm>,
) -> Result<Redirect, ApiError> {
    let track_id: RaceTrackId = parse_id(&id, "race track")?;
    let valid = validate_race_track(&form).map_err(ApiError::Validation)?;

    let updated = state
        .race_tracks
        .update(
            track_id,
            UpdateRaceTrack {
                name: valid.name,
                difficulty: valid.difficulty,
                length_meters: valid.length_meters,
                location: valid.location,
                record_time: valid.record_time,
            },
        )
        .await?;

    if updated.is_none() {
        return Err(ApiError::NotFound {
            entity: "race track",
        });
    }

    info!(track_id = %track_id, "race track updated");
    Ok(Redirect::to("/racetracks/"))
}

async fn confirm_delete_race_track(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    let track_id: RaceTrackId = parse_id(&id, "race track")?;
    let record = state
        .race_tracks
        .find_by_id(track_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "race track",
        })?;

    let display = format!("{} ({})", record.name, record.difficulty.label());
    Ok(Json(DeleteConfirmation::new(id, display)))
}

async fn delete_race_track(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let track_id: RaceTrackId = parse_id(&id, "race track")?;
    let deleted = state.race_tracks.delete(track_id).await?;
    if !deleted {
        return Err(ApiError::NotFound {
            entity: "race track",
        });
    }

    info!(track_id = %track_id, "race track deleted");
    Ok(Redirect::to("/racetracks/"))
}
