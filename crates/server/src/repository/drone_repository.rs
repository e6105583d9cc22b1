use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use racelink_core::domain::{DroneId, ManufacturerId, PilotId, SkillRating};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};

use crate::entity::{drone, drone_pilot, manufacturer, pilot};
use crate::repository::{
    contains_insensitive, map_unique_violation, ListPage, PageRequest, RepoError, RepoResult,
};

#[derive(Debug, Clone)]
pub struct DroneRecord {
    pub id: DroneId,
    pub model_name: String,
    pub max_speed: f64,
    pub weight_kg: f64,
    pub manufacturer_id: ManufacturerId,
}

/// Listing row: manufacturer name and the assigned pilots come along so the
/// view never issues per-row queries.
#[derive(Debug, Clone)]
pub struct DroneListItem {
    pub drone: DroneRecord,
    pub manufacturer_name: String,
    pub pilot_ids: Vec<PilotId>,
}

#[derive(Debug, Clone)]
pub struct DroneDetail {
    pub drone: DroneRecord,
    pub manufacturer: ManufacturerRef,
    pub pilots: Vec<DronePilotRecord>,
}

#[derive(Debug, Clone)]
pub struct ManufacturerRef {
    pub id: ManufacturerId,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct DronePilotRecord {
    pub id: PilotId,
    pub username: String,
    pub skill_rating: SkillRating,
}

#[derive(Debug, Clone)]
pub struct NewDrone {
    pub model_name: String,
    pub max_speed: f64,
    pub weight_kg: f64,
    pub manufacturer_id: ManufacturerId,
}

#[derive(Debug, Clone)]
pub struct UpdateDrone {
    pub model_name: String,
    pub max_speed: f64,
    pub weight_kg: f64,
    pub manufacturer_id: ManufacturerId,
}

/// Final state of the pair after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Assigned,
    Unassigned,
}

#[async_trait]
pub trait DroneRepository: Send + Sync {
    async fn list(
        &self,
        model_name_filter: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<ListPage<DroneListItem>>;
    async fn find_by_id(&self, drone_id: DroneId) -> RepoResult<Option<DroneDetail>>;
    async fn create(&self, new_drone: NewDrone) -> RepoResult<DroneRecord>;
    async fn update(&self, drone_id: DroneId, update: UpdateDrone)
        -> RepoResult<Option<DroneRecord>>;
    async fn delete(&self, drone_id: DroneId) -> RepoResult<bool>;
    /// Atomic conditional add/remove of the (drone, pilot) pair: the pair is
    /// deleted if present, inserted otherwise, inside one transaction.
    async fn toggle_pilot(&self, drone_id: DroneId, pilot_id: PilotId)
        -> RepoResult<ToggleOutcome>;
}

#[derive(Clone)]
pub struct SeaOrmDroneRepository {
    db: DatabaseConnection,
}

impl SeaOrmDroneRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: drone::Model) -> RepoResult<DroneRecord> {
        let id = DroneId::from_str(&model.id)
            .map_err(|e| RepoError::Corrupt(format!("invalid drone.id '{}': {e}", model.id)))?;
        let manufacturer_id = ManufacturerId::from_str(&model.manufacturer_id).map_err(|e| {
            RepoError::Corrupt(format!(
                "invalid drone.manufacturer_id '{}': {e}",
                model.manufacturer_id
            ))
        })?;

        Ok(DroneRecord {
            id,
            model_name: model.model_name,
            max_speed: model.max_speed,
            weight_kg: model.weight_kg,
            manufacturer_id,
        })
    }

    const UNIQUE_FIELDS: &'static [(&'static str, &'static str)] =
        &[("model_name", "model_name")];

    fn map_write_err(err: sea_orm::DbErr) -> RepoError {
        if matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) {
            return RepoError::UnknownReference {
                entity: "manufacturer",
                field: "manufacturer",
            };
        }
        map_unique_violation(err, Self::UNIQUE_FIELDS)
    }
}

#[async_trait]
impl DroneRepository for SeaOrmDroneRepository {
    async fn list(
        &self,
        model_name_filter: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<ListPage<DroneListItem>> {
        let mut query = drone::Entity::find()
            .find_also_related(manufacturer::Entity)
            .order_by_asc(drone::Column::ModelName);
        if let Some(needle) = model_name_filter {
            query = query.filter(contains_insensitive(drone::Column::ModelName, needle));
        }

        let paginator = query.paginate(&self.db, page.page_size.max(1));
        let total = paginator.num_items().await?;
        let page_count = paginator.num_pages().await?;
        let rows = paginator.fetch_page(page.page.max(1) - 1).await?;

        let drone_ids: Vec<String> = rows.iter().map(|(d, _)| d.id.clone()).collect();
        let mut pilots_by_drone: HashMap<String, Vec<PilotId>> = HashMap::new();
        if !drone_ids.is_empty() {
            let links = drone_pilot::Entity::find()
                .filter(drone_pilot::Column::DroneId.is_in(drone_ids))
                .all(&self.db)
                .await?;
            for link in links {
                let pilot_id = PilotId::from_str(&link.pilot_id).map_err(|e| {
                    RepoError::Corrupt(format!(
                        "invalid drone_pilot.pilot_id '{}': {e}",
                        link.pilot_id
                    ))
                })?;
                pilots_by_drone
                    .entry(link.drone_id)
                    .or_default()
                    .push(pilot_id);
            }
        }

        let mut items = Vec::with_capacity(rows.len());
        for (drone_model, maker) in rows {
            let pilot_ids = pilots_by_drone.remove(&drone_model.id).unwrap_or_default();
            items.push(DroneListItem {
                manufacturer_name: maker.map(|m| m.name).unwrap_or_default(),
                drone: Self::map_model(drone_model)?,
                pilot_ids,
            });
        }

        Ok(ListPage {
            items,
            page: page.page.max(1),
            page_size: page.page_size.max(1),
            page_count,
            total,
        })
    }

    async fn find_by_id(&self, drone_id: DroneId) -> RepoResult<Option<DroneDetail>> {
        let Some((drone_model, maker)) = drone::Entity::find_by_id(drone_id.to_string())
            .find_also_related(manufacturer::Entity)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let Some(maker) = maker else {
            return Err(RepoError::Corrupt(format!(
                "drone '{}' has no manufacturer row",
                drone_model.id
            )));
        };
        let manufacturer = ManufacturerRef {
            id: ManufacturerId::from_str(&maker.id).map_err(|e| {
                RepoError::Corrupt(format!("invalid manufacturer.id '{}': {e}", maker.id))
            })?,
            name: maker.name,
            country: maker.country,
        };

        let pilot_models = drone_model
            .find_related(pilot::Entity)
            .order_by_asc(pilot::Column::Username)
            .all(&self.db)
            .await?;

        let mut pilots = Vec::with_capacity(pilot_models.len());
        for pilot_model in pilot_models {
            let id = PilotId::from_str(&pilot_model.id).map_err(|e| {
                RepoError::Corrupt(format!("invalid pilot.id '{}': {e}", pilot_model.id))
            })?;
            let skill_rating = SkillRating::new(pilot_model.skill_rating as i32)
                .map_err(|e| RepoError::Corrupt(format!("invalid pilot.skill_rating: {e}")))?;
            pilots.push(DronePilotRecord {
                id,
                username: pilot_model.username,
                skill_rating,
            });
        }

        Ok(Some(DroneDetail {
            drone: Self::map_model(drone_model)?,
            manufacturer,
            pilots,
        }))
    }

    async fn create(&self, new_drone: NewDrone) -> RepoResult<DroneRecord> {
        let id = DroneId::new();

        let active_model = drone::ActiveModel {
            id: Set(id.to_string()),
            model_name: Set(new_drone.model_name),
            max_speed: Set(new_drone.max_speed),
            weight_kg: Set(new_drone.weight_kg),
            manufacturer_id: Set(new_drone.manufacturer_id.to_string()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(Self::map_write_err)?;
        Self::map_model(model)
    }

    async fn update(
        &self,
        drone_id: DroneId,
        update: UpdateDrone,
    ) -> RepoResult<Option<DroneRecord>> {
        let Some(model) = drone::Entity::find_by_id(drone_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: drone::ActiveModel = model.into();
        active_model.model_name = Set(update.model_name);
        active_model.max_speed = Set(update.max_speed);
        active_model.weight_kg = Set(update.weight_kg);
        active_model.manufacturer_id = Set(update.manufacturer_id.to_string());
        active_model.updated_at = Set(chrono::Utc::now().naive_utc());

        let model = active_model
            .update(&self.db)
            .await
            .map_err(Self::map_write_err)?;
        Self::map_model(model).map(Some)
    }

    async fn delete(&self, drone_id: DroneId) -> RepoResult<bool> {
        let txn = self.db.begin().await?;

        let Some(model) = drone::Entity::find_by_id(drone_id.to_string())
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        drone_pilot::Entity::delete_many()
            .filter(drone_pilot::Column::DroneId.eq(model.id.clone()))
            .exec(&txn)
            .await?;
        model.delete(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    async fn toggle_pilot(
        &self,
        drone_id: DroneId,
        pilot_id: PilotId,
    ) -> RepoResult<ToggleOutcome> {
        let txn = self.db.begin().await?;

        let exists = drone::Entity::find_by_id(drone_id.to_string())
            .one(&txn)
            .await?
            .is_some();
        if !exists {
            return Err(RepoError::NotFound { entity: "drone" });
        }

        let deleted = drone_pilot::Entity::delete_many()
            .filter(drone_pilot::Column::DroneId.eq(drone_id.to_string()))
            .filter(drone_pilot::Column::PilotId.eq(pilot_id.to_string()))
            .exec(&txn)
            .await?;

        let outcome = if deleted.rows_affected > 0 {
            ToggleOutcome::Unassigned
        } else {
            let link = drone_pilot::ActiveModel {
                drone_id: Set(drone_id.to_string()),
                pilot_id: Set(pilot_id.to_string()),
            };
            match drone_pilot::Entity::insert(link).exec(&txn).await {
                Ok(_) => ToggleOutcome::Assigned,
                // A concurrent toggle added the pair first; the final state
                // is still "assigned", so the losing request is a no-op.
                Err(err)
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    ToggleOutcome::Assigned
                }
                Err(err) => return Err(err.into()),
            }
        };

        txn.commit().await?;
        Ok(outcome)
    }
}
