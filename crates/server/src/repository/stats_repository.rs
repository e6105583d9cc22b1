use std::str::FromStr;

use async_trait::async_trait;
use racelink_core::domain::{DroneId, PilotId, SkillRating};
use sea_orm::sea_query::JoinType;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    RelationTrait,
};

use crate::entity::{drone, drone_pilot, manufacturer, pilot, race_track};
use crate::repository::{RepoError, RepoResult};

/// Everything the landing view shows, recomputed on every request.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub num_pilots: u64,
    pub num_drones: u64,
    pub num_manufacturers: u64,
    pub num_race_tracks: u64,
    pub top_pilots: Vec<TopPilot>,
    pub popular_drones: Vec<PopularDrone>,
}

#[derive(Debug, Clone)]
pub struct TopPilot {
    pub id: PilotId,
    pub username: String,
    pub skill_rating: SkillRating,
}

#[derive(Debug, Clone)]
pub struct PopularDrone {
    pub id: DroneId,
    pub model_name: String,
    pub pilot_count: u64,
}

const RANKING_SIZE: u64 = 5;

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn dashboard(&self) -> RepoResult<DashboardStats>;
}

#[derive(Clone)]
pub struct SeaOrmStatsRepository {
    db: DatabaseConnection,
}

impl SeaOrmStatsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatsRepository for SeaOrmStatsRepository {
    async fn dashboard(&self) -> RepoResult<DashboardStats> {
        let num_pilots = pilot::Entity::find().count(&self.db).await?;
        let num_drones = drone::Entity::find().count(&self.db).await?;
        let num_manufacturers = manufacturer::Entity::find().count(&self.db).await?;
        let num_race_tracks = race_track::Entity::find().count(&self.db).await?;

        let top_models = pilot::Entity::find()
            .order_by_desc(pilot::Column::SkillRating)
            .order_by_asc(pilot::Column::Username)
            .limit(RANKING_SIZE)
            .all(&self.db)
            .await?;

        let mut top_pilots = Vec::with_capacity(top_models.len());
        for model in top_models {
            let id = PilotId::from_str(&model.id)
                .map_err(|e| RepoError::Corrupt(format!("invalid pilot.id '{}': {e}", model.id)))?;
            let skill_rating = SkillRating::new(model.skill_rating as i32)
                .map_err(|e| RepoError::Corrupt(format!("invalid pilot.skill_rating: {e}")))?;
            top_pilots.push(TopPilot {
                id,
                username: model.username,
                skill_rating,
            });
        }

        // COUNT(pilot_id) over a left join, so drones with no crew rank at 0.
        let ranked: Vec<(String, String, i64)> = drone::Entity::find()
            .select_only()
            .column(drone::Column::Id)
            .column(drone::Column::ModelName)
            .column_as(drone_pilot::Column::PilotId.count(), "pilot_count")
            .join(JoinType::LeftJoin, drone::Relation::DronePilot.def())
            .group_by(drone::Column::Id)
            .group_by(drone::Column::ModelName)
            .order_by_desc(drone_pilot::Column::PilotId.count())
            .order_by_asc(drone::Column::ModelName)
            .limit(RANKING_SIZE)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut popular_drones = Vec::with_capacity(ranked.len());
        for (id, model_name, pilot_count) in ranked {
            let id = DroneId::from_str(&id)
                .map_err(|e| RepoError::Corrupt(format!("invalid drone.id '{id}': {e}")))?;
            popular_drones.push(PopularDrone {
                id,
                model_name,
                pilot_count: pilot_count as u64,
            });
        }

        Ok(DashboardStats {
            num_pilots,
            num_drones,
            num_manufacturers,
            num_race_tracks,
            top_pilots,
            popular_drones,
        })
    }
}
