use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Form, Json, Router};
use chrono::NaiveDate;
use racelink_api_types::Page;
use racelink_core::domain::PilotId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::hash_password;
use crate::repository::{NewPilot, PageRequest, PilotDetail, PilotRecord, UpdatePilot};

use super::auth::CurrentPilot;
use super::error::ApiError;
use super::forms::{
    validate_pilot_create, validate_pilot_update, PilotCreateForm, PilotUpdateForm,
};
use super::state::AppState;
use super::{none_if_empty, parse_id, to_page, DeleteConfirmation, FormPrompt};

pub fn create_pilot_router() -> Router<AppState> {
    Router::new()
        .route("/pilots/", get(list_pilots))
        .route("/pilots/create/", get(create_pilot_form).post(create_pilot))
        .route("/pilots/{id}/", get(pilot_detail))
        .route(
            "/pilots/{id}/update/",
            get(update_pilot_form).post(update_pilot),
        )
        .route(
            "/pilots/{id}/delete/",
            get(confirm_delete_pilot).post(delete_pilot),
        )
}

#[derive(Debug, Deserialize)]
struct PilotListQuery {
    #[serde(default = "super::default_page")]
    page: u64,
    /// Case-insensitive substring match on the username.
    #[serde(default)]
    username: String,
}

#[derive(Debug, Serialize)]
struct PilotResponse {
    id: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    drone_license: String,
    skill_rating: u8,
    certification_date: Option<NaiveDate>,
}

impl From<PilotRecord> for PilotResponse {
    fn from(record: PilotRecord) -> Self {
        Self {
            id: record.id.to_string(),
            username: record.username,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            drone_license: record.drone_license.into(),
            skill_rating: record.skill_rating.value(),
            certification_date: record.certification_date,
        }
    }
}

#[derive(Debug, Serialize)]
struct PilotDroneResponse {
    id: String,
    model_name: String,
    manufacturer_name: String,
}

#[derive(Debug, Serialize)]
struct PilotDetailResponse {
    #[serde(flatten)]
    pilot: PilotResponse,
    drones: Vec<PilotDroneResponse>,
}

impl From<PilotDetail> for PilotDetailResponse {
    fn from(detail: PilotDetail) -> Self {
        Self {
            pilot: detail.pilot.into(),
            drones: detail
                .drones
                .into_iter()
                .map(|d| PilotDroneResponse {
                    id: d.id.to_string(),
                    model_name: d.model_name,
                    manufacturer_name: d.manufacturer_name,
                })
                .collect(),
        }
    }
}

async fn list_pilots(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Query(query): Query<PilotListQuery>,
) -> Result<Json<Page<PilotResponse>>, ApiError> {
    let page = state
        .pilots
        .list(
            none_if_empty(&query.username),
            PageRequest {
                page: query.page,
                page_size: state.page_size,
            },
        )
        .await?;

    Ok(Json(to_page(page, PilotResponse::from)))
}

async fn pilot_detail(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PilotDetailResponse>, ApiError> {
    let pilot_id: PilotId = parse_id(&id, "pilot")?;
    let detail = state
        .pilots
        .find_by_id(pilot_id)
        .await?
        .ok_or(ApiError::NotFound { entity: "pilot" })?;

    Ok(Json(detail.into()))
}

async fn create_pilot_form(_pilot: CurrentPilot) -> Json<FormPrompt> {
    Json(FormPrompt::new(&[
        "username",
        "first_name",
        "last_name",
        "email",
        "drone_license",
        "skill_rating",
        "certification_date",
        "password",
        "password_confirm",
    ]))
}

async fn update_pilot_form(_pilot: CurrentPilot) -> Json<FormPrompt> {
    Json(FormPrompt::new(&[
        "username",
        "first_name",
        "last_name",
        "email",
        "drone_license",
        "skill_rating",
        "certification_date",
    ]))
}

async fn create_pilot(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Form(form): Form<PilotCreateForm>,
) -> Result<Redirect, ApiError> {
    let (valid, password) = validate_pilot_create(&form).map_err(ApiError::Validation)?;
    let password_hash = hash_password(&password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let record = state
        .pilots
        .create(NewPilot {
            username: valid.username,
            first_name: valid.first_name,
            last_name: valid.last_name,
            email: valid.email,
            password_hash,
            drone_license: valid.drone_license,
            skill_rating: valid.skill_rating,
            certification_date: valid.certification_date,
        })
        .await?;

    info!(pilot_id = %record.id, username = %record.username, "pilot created");
    Ok(Redirect::to("/pilots/"))
}

async fn update_pilot(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<PilotUpdateForm>,
) -> Result<Redirect, ApiError> {
    let pilot_id: PilotId = parse_id(&id, "pilot")?;
    let valid = validate_pilot_update(&form).map_err(ApiError::Validation)?;

    let updated = state
        .pilots
        .update(
            pilot_id,
            UpdatePilot {
                username: valid.username,
                first_name: valid.first_name,
                last_name: valid.last_name,
                email: valid.email,
                drone_license: valid.drone_license,
                skill_rating: valid.skill_rating,
                certification_date: valid.certification_date,
            },
        )
        .await?;

    if updated.is_none() {
        return Err(ApiError::NotFound { entity: "pilot" });
    }

    info!(pilot_id = %pilot_id, "pilot updated");
    Ok(Redirect::to("/pilots/"))
}

async fn confirm_delete_pilot(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    let pilot_id: PilotId = parse_id(&id, "pilot")?;
    let detail = state
        .pilots
        .find_by_id(pilot_id)
        .await?
        .ok_or(ApiError::NotFound { entity: "pilot" })?;

    let display = format!(
        "{} (Rating: {})",
        detail.pilot.username,
        detail.pilot.skill_rating.value()
    );
    Ok(Json(DeleteConfirmation::new(id, display)))
}

async fn delete_pilot(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let pilot_id: PilotId = parse_id(&id, "pilot")?;
    let deleted = state.pilots.delete(pilot_id).await?;
    if !deleted {
        return Err(ApiError::NotFound { entity: "pilot" });
    }

    info!(pilot_id = %pilot_id, "pilot deleted");
    Ok(Redirect::to("/pilots/"))
}
