use axum::extract::{Path, Query, State};
use axum::http::header::REFERER;
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use racelink_api_types::Page;
use racelink_core::domain::DroneId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::repository::{DroneDetail, DroneListItem, NewDrone, PageRequest, UpdateDrone};

use super::auth::CurrentPilot;
use super::error::ApiError;
use super::forms::{validate_drone, DroneForm};
use super::state::AppState;
use super::{none_if_empty, parse_id, to_page, DeleteConfirmation, FormPrompt};

pub fn create_drone_router() -> Router<AppState> {
    Router::new()
        .route("/drones/", get(list_drones))
        .route("/drones/create/", get(drone_form).post(create_drone))
        .route("/drones/{id}/", get(drone_detail))
        .route("/drones/{id}/update/", get(drone_form).post(update_drone))
        .route(
            "/drones/{id}/delete/",
            get(confirm_delete_drone).post(delete_drone),
        )
        .route("/drones/{id}/toggle-assign/", post(toggle_assign))
}

#[derive(Debug, Deserialize)]
struct DroneListQuery {
    #[serde(default = "super::default_page")]
    page: u64,
    /// Case-insensitive substring match on the model name.
    #[serde(default)]
    model_name: String,
}

#[derive(Debug, Serialize)]
struct DroneListResponse {
    id: String,
    model_name: String,
    max_speed: f64,
    weight_kg: f64,
    manufacturer_name: String,
    pilot_count: usize,
    /// Whether the authenticated pilot is currently assigned to this drone.
    assigned_to_me: bool,
}

#[derive(Debug, Serialize)]
struct DronePilotResponse {
    id: String,
    username: String,
    skill_rating: u8,
}

#[derive(Debug, Serialize)]
struct DroneManufacturerResponse {
    id: String,
    name: String,
    country: String,
}

#[derive(Debug, Serialize)]
struct DroneDetailResponse {
    id: String,
    model_name: String,
    max_speed: f64,
    weight_kg: f64,
    manufacturer: DroneManufacturerResponse,
    pilots: Vec<DronePilotResponse>,
}

impl From<DroneDetail> for DroneDetailResponse {
    fn from(detail: DroneDetail) -> Self {
        Self {
            id: detail.drone.id.to_string(),
            model_name: detail.drone.model_name,
            max_speed: detail.drone.max_speed,
            weight_kg: detail.drone.weight_kg,
            manufacturer: DroneManufacturerResponse {
                id: detail.manufacturer.id.to_string(),
                name: detail.manufacturer.name,
                country: detail.manufacturer.country,
            },
            pilots: detail
                .pilots
                .into_iter()
                .map(|p| DronePilotResponse {
                    id: p.id.to_string(),
                    username: p.username,
                    skill_rating: p.skill_rating.value(),
                })
                .collect(),
        }
    }
}

async fn list_drones(
    pilot: CurrentPilot,
    State(state): State<AppState>,
    Query(query): Query<DroneListQuery>,
) -> Result<Json<Page<DroneListResponse>>, ApiError> {
    let page = state
        .drones
        .list(
            none_if_empty(&query.model_name),
            PageRequest {
                page: query.page,
                page_size: state.page_size,
            },
        )
        .await?;

    let caller_id = pilot.id;
    Ok(Json(to_page(page, |item: DroneListItem| {
        let assigned_to_me = item.pilot_ids.contains(&caller_id);
        DroneListResponse {
            id: item.drone.id.to_string(),
            model_name: item.drone.model_name,
            max_speed: item.drone.max_speed,
            weight_kg: item.drone.weight_kg,
            manufacturer_name: item.manufacturer_name,
            pilot_count: item.pilot_ids.len(),
            assigned_to_me,
        }
    })))
}

async fn drone_detail(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DroneDetailResponse>, ApiError> {
    let drone_id: DroneId = parse_id(&id, "drone")?;
    let detail = state
        .drones
        .find_by_id(drone_id)
        .await?
        .ok_or(ApiError::NotFound { entity: "drone" })?;

    Ok(Json(detail.into()))
}

async fn drone_form(_pilot: CurrentPilot) -> Json<FormPrompt> {
    Json(FormPrompt::new(&[
        "model_name",
        "max_speed",
        "weight",
        "manufacturer",
    ]))
}

async fn create_drone(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Form(form): Form<DroneForm>,
) -> Result<Redirect, ApiError> {
    let valid = validate_drone(&form).map_err(ApiError::Validation)?;

    let record = state
        .drones
        .create(NewDrone {
            model_name: valid.model_name,
            max_speed: valid.max_speed,
            weight_kg: valid.weight_kg,
            manufacturer_id: valid.manufacturer_id,
        })
        .await?;

    info!(drone_id = %record.id, model_name = %record.model_name, "drone created");
    Ok(Redirect::to("/drones/"))
}

async fn update_drone(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DroneForm>,
) -> Result<Redirect, ApiError> {
    let drone_id: DroneId = parse_id(&id, "drone")?;
    let valid = validate_drone(&form).map_err(ApiError::Validation)?;

    let updated = state
        .drones
        .update(
            drone_id,
            UpdateDrone {
                model_name: valid.model_name,
                max_speed: valid.max_speed,
                weight_kg: valid.weight_kg,
                manufacturer_id: valid.manufacturer_id,
            },
        )
        .await?;

    if updated.is_none() {
        return Err(ApiError::NotFound { entity: "drone" });
    }

    info!(drone_id = %drone_id, "drone updated");
    Ok(Redirect::to("/drones/"))
}

async fn confirm_delete_drone(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    let drone_id: DroneId = parse_id(&id, "drone")?;
    let detail = state
        .drones
        .find_by_id(drone_id)
        .await?
        .ok_or(ApiError::NotFound { entity: "drone" })?;

    let display = format!("{} ({})", detail.drone.model_name, detail.manufacturer.name);
    Ok(Json(DeleteConfirmation::new(id, display)))
}

async fn delete_drone(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let drone_id: DroneId = parse_id(&id, "drone")?;
    let deleted = state.drones.delete(drone_id).await?;
    if !deleted {
        return Err(ApiError::NotFound { entity: "drone" });
    }

    info!(drone_id = %drone_id, "drone deleted");
    Ok(Redirect::to("/drones/"))
}

/// Toggle the calling pilot's assignment to this drone, then send them back
/// to wherever they came from (the drone list when no referrer is present).
async fn toggle_assign(
    pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Redirect, ApiError> {
    let drone_id: DroneId = parse_id(&id, "drone")?;
    let outcome = state.drones.toggle_pilot(drone_id, pilot.id).await?;

    info!(
        username = %pilot.username,
        drone_id = %drone_id,
        ?outcome,
        "toggled drone assignment"
    );

    let target = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/drones/");
    Ok(Redirect::to(target))
}
