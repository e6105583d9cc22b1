//! Persistence layer: one trait + sea-orm implementation per entity.
//!
//! Repositories are handed to the API layer as `Arc<dyn …>` so handlers
//! never touch a process-wide connection.

pub mod drone_repository;
pub mod manufacturer_repository;
pub mod pilot_repository;
pub mod race_track_repository;
pub mod stats_repository;

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, DbErr, SqlErr};
use thiserror::Error;

pub use drone_repository::{
    DroneDetail, DroneListItem, DronePilotRecord, DroneRecord, DroneRepository, ManufacturerRef,
    NewDrone, SeaOrmDroneRepository, ToggleOutcome, UpdateDrone,
};
pub use manufacturer_repository::{
    ManufacturerDetail, ManufacturerDroneRecord, ManufacturerListItem, ManufacturerRecord,
    ManufacturerRepository, NewManufacturer, SeaOrmManufacturerRepository, UpdateManufacturer,
};
pub use pilot_repository::{
    AuthPilotRecord, NewPilot, PilotDetail, PilotDroneRecord, PilotRecord, PilotRepository,
    SeaOrmPilotRepository, UpdatePilot,
};
pub use race_track_repository::{
    NewRaceTrack, RaceTrackRecord, RaceTrackRepository, SeaOrmRaceTrackRepository,
    UpdateRaceTrack,
};
pub use stats_repository::{
    DashboardStats, PopularDrone, SeaOrmStatsRepository, StatsRepository, TopPilot,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("duplicate value for {field}")]
    Duplicate { field: &'static str },

    #[error("no {entity} matches {field}")]
    UnknownReference {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid row in database: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// 1-based page request. Page size is chosen by the caller (the API layer
/// takes it from config, default 5).
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

/// One page of typed records plus the totals needed for page navigation.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub page_count: u64,
    pub total: u64,
}

impl<T> ListPage<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            page_count: self.page_count,
            total: self.total,
        }
    }
}

/// Case-insensitive substring match: `LOWER(col) LIKE '%needle%'`.
pub(crate) fn contains_insensitive<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.to_lowercase()))
}

/// Map a store-level unique violation onto the field it protects, so the
/// caller sees a form error instead of a 500. `fields` pairs each unique
/// field with a marker substring of its constraint message.
pub(crate) fn map_unique_violation(
    err: DbErr,
    fields: &[(&'static str, &'static str)],
) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        for &(field, marker) in fields {
            if message.contains(marker) {
                return RepoError::Duplicate { field };
            }
        }
        if let Some(&(field, _)) = fields.first() {
            return RepoError::Duplicate { field };
        }
    }
    RepoError::Db(err)
}
