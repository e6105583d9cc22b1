//! Shared application state, handed to every handler.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::AuthConfig;
use crate::config::ServerConfig;
use crate::repository::{
    DroneRepository, ManufacturerRepository, PilotRepository, RaceTrackRepository,
    SeaOrmDroneRepository, SeaOrmManufacturerRepository, SeaOrmPilotRepository,
    SeaOrmRaceTrackRepository, SeaOrmStatsRepository, StatsRepository,
};

/// Repository handles plus request-independent settings. Repositories are
/// trait objects so tests can run against any implementation.
#[derive(Clone)]
pub struct AppState {
    pub pilots: Arc<dyn PilotRepository>,
    pub manufacturers: Arc<dyn ManufacturerRepository>,
    pub drones: Arc<dyn DroneRepository>,
    pub race_tracks: Arc<dyn RaceTrackRepository>,
    pub stats: Arc<dyn StatsRepository>,
    pub auth: AuthConfig,
    pub page_size: u64,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &ServerConfig) -> Self {
        Self {
            pilots: Arc::new(SeaOrmPilotRepository::new(db.clone())),
            manufacturers: Arc::new(SeaOrmManufacturerRepository::new(db.clone())),
            drones: Arc::new(SeaOrmDroneRepository::new(db.clone())),
            race_tracks: Arc::new(SeaOrmRaceTrackRepository::new(db.clone())),
            stats: Arc::new(SeaOrmStatsRepository::new(db)),
            auth: config.auth_config(),
            page_size: config.page_size,
        }
    }
}
