use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Form, Json, Router};
use racelink_api_types::Page;
use racelink_core::domain::ManufacturerId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::repository::{
    ManufacturerDetail, ManufacturerListItem, ManufacturerRecord, NewManufacturer, PageRequest,
    UpdateManufacturer,
};

use super::auth::CurrentPilot;
use super::error::ApiError;
use super::forms::{validate_manufacturer, ManufacturerForm};
use super::state::AppState;
use super::{none_if_empty, parse_id, to_page, DeleteConfirmation, FormPrompt};

pub fn create_manufacturer_router() -> Router<AppState> {
    Router::new()
        .route("/manufacturers/", get(list_manufacturers))
        .route(
            "/manufacturers/create/",
            get(manufacturer_form).post(create_manufacturer),
        )
        .route("/manufacturers/{id}/", get(manufacturer_detail))
        .route(
            "/manufacturers/{id}/update/",
            get(manufacturer_form).post(update_manufacturer),
        )
        .route(
            "/manufacturers/{id}/delete/",
            get(confirm_delete_manufacturer).post(delete_manufacturer),
        )
}

#[derive(Debug, Deserialize)]
struct ManufacturerListQuery {
    #[serde(default = "super::default_page")]
    page: u64,
    /// Case-insensitive substring match on the name.
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
struct ManufacturerResponse {
    id: String,
    name: String,
    country: String,
}

impl From<ManufacturerRecord> for ManufacturerResponse {
    fn from(record: ManufacturerRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            country: record.country,
        }
    }
}

#[derive(Debug, Serialize)]
struct ManufacturerListResponse {
    #[serde(flatten)]
    manufacturer: ManufacturerResponse,
    drone_count: u64,
}

impl From<ManufacturerListItem> for ManufacturerListResponse {
    fn from(item: ManufacturerListItem) -> Self {
        Self {
            manufacturer: item.manufacturer.into(),
            drone_count: item.drone_count,
        }
    }
}

#[derive(Debug, Serialize)]
struct ManufacturerDroneResponse {
    id: String,
    model_name: String,
    max_speed: f64,
    pilot_count: u64,
}

#[derive(Debug, Serialize)]
struct ManufacturerDetailResponse {
    #[serde(flatten)]
    manufacturer: ManufacturerResponse,
    drones: Vec<ManufacturerDroneResponse>,
}

impl From<ManufacturerDetail> for ManufacturerDetailResponse {
    fn from(detail: ManufacturerDetail) -> Self {
        Self {
            manufacturer: detail.manufacturer.into(),
            drones: detail
                .drones
                .into_iter()
                .map(|d| ManufacturerDroneResponse {
                    id: d.id.to_string(),
                    model_name: d.model_name,
                    max_speed: d.max_speed,
                    pilot_count: d.pilot_count,
                })
                .collect(),
        }
    }
}

async fn list_manufacturers(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Query(query): Query<ManufacturerListQuery>,
) -> Result<Json<Page<ManufacturerListResponse>>, ApiError> {
    let page = state
        .manufacturers
        .list(
            none_if_empty(&query.name),
            PageRequest {
                page: query.page,
                page_size: state.page_size,
            },
        )
        .await?;

    Ok(Json(to_page(page, ManufacturerListResponse::from)))
}

async fn manufacturer_detail(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ManufacturerDetailResponse>, ApiError> {
    let manufacturer_id: ManufacturerId = parse_id(&id, "manufacturer")?;
    let detail = state
        .manufacturers
        .find_by_id(manufacturer_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "manufacturer",
        })?;

    Ok(Json(detail.into()))
}

async fn manufacturer_form(_pilot: CurrentPilot) -> Json<FormPrompt> {
    Json(FormPrompt::new(&["name", "country"]))
}

async fn create_manufacturer(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Form(form): Form<ManufacturerForm>,
) -> Result<Redirect, ApiError> {
    let valid = validate_manufacturer(&form).map_err(ApiError::Validation)?;

    let record = state
        .manufacturers
        .create(NewManufacturer {
            name: valid.name,
            country: valid.country,
        })
        .await?;

    info!(manufacturer_id = %record.id, name = %record.name, "manufacturer created");
    Ok(Redirect::to("/manufacturers/"))
}

async fn update_manufacturer(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ManufacturerForm>,
) -> Result<Redirect, ApiError> {
    let manufacturer_id: ManufacturerId = parse_id(&id, "manufacturer")?;
    let valid = validate_manufacturer(&form).map_err(ApiError::Validation)?;

    let updated = state
        .manufacturers
        .update(
            manufacturer_id,
            UpdateManufacturer {
                name: valid.name,
                country: valid.country,
            },
        )
        .await?;

    if updated.is_none() {
        return Err(ApiError::NotFound {
            entity: "manufacturer",
        });
    }

    info!(manufacturer_id = %manufacturer_id, "manufacturer updated");
    Ok(Redirect::to("/manufacturers/"))
}

async fn confirm_delete_manufacturer(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    let manufacturer_id: ManufacturerId = parse_id(&id, "manufacturer")?;
    let detail = state
        .manufacturers
        .find_by_id(manufacturer_id)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "manufacturer",
        })?;

    let display = format!(
        "{} ({}), deleting also removes {} drone(s)",
        detail.manufacturer.name,
        detail.manufacturer.country,
        detail.drones.len()
    );
    Ok(Json(DeleteConfirmation::new(id, display)))
}

async fn delete_manufacturer(
    _pilot: CurrentPilot,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let manufacturer_id: ManufacturerId = parse_id(&id, "manufacturer")?;
    let deleted = state.manufacturers.delete(manufacturer_id).await?;
    if !deleted {
        return Err(ApiError::NotFound {
            entity: "manufacturer",
        });
    }

    info!(manufacturer_id = %manufacturer_id, "manufacturer deleted (with its drones)");
    Ok(Redirect::to("/manufacturers/"))
}
