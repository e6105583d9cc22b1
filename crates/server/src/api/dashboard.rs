//! Landing page: entity counts plus the current leaderboards.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::repository::DashboardStats;

use super::auth::CurrentPilot;
use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Serialize)]
struct TopPilotResponse {
    id: String,
    username: String,
    skill_rating: u8,
}

#[derive(Debug, Serialize)]
struct PopularDroneResponse {
    id: String,
    model_name: String,
    pilot_count: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    username: String,
    num_pilots: u64,
    num_drones: u64,
    num_manufacturers: u64,
    num_race_tracks: u64,
    top_pilots: Vec<TopPilotResponse>,
    popular_drones: Vec<PopularDroneResponse>,
}

impl DashboardResponse {
    fn new(username: String, stats: DashboardStats) -> Self {
        Self {
            username,
            num_pilots: stats.num_pilots,
            num_drones: stats.num_drones,
            num_manufacturers: stats.num_manufacturers,
            num_race_tracks: stats.num_race_tracks,
            top_pilots: stats
                .top_pilots
                .into_iter()
                .map(|p| TopPilotResponse {
                    id: p.id.to_string(),
                    username: p.username,
                    skill_rating: p.skill_rating.value(),
                })
                .collect(),
            popular_drones: stats
                .popular_drones
                .into_iter()
                .map(|d| PopularDroneResponse {
                    id: d.id.to_string(),
                    model_name: d.model_name,
                    pilot_count: d.pilot_count,
                })
                .collect(),
        }
    }
}

pub(crate) async fn index(
    pilot: CurrentPilot,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let stats = state.stats.dashboard().await?;
    Ok(Json(DashboardResponse::new(pilot.username, stats)))
}
