use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use racelink_core::domain::{DroneId, ManufacturerId};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

use crate::entity::{drone, drone_pilot, manufacturer};
use crate::repository::{
    contains_insensitive, map_unique_violation, ListPage, PageRequest, RepoError, RepoResult,
};

#[derive(Debug, Clone)]
pub struct ManufacturerRecord {
    pub id: ManufacturerId,
    pub name: String,
    pub country: String,
}

/// Listing row: the record plus how many drones it produces.
#[derive(Debug, Clone)]
pub struct ManufacturerListItem {
    pub manufacturer: ManufacturerRecord,
    pub drone_count: u64,
}

#[derive(Debug, Clone)]
pub struct ManufacturerDetail {
    pub manufacturer: ManufacturerRecord,
    pub drones: Vec<ManufacturerDroneRecord>,
}

#[derive(Debug, Clone)]
pub struct ManufacturerDroneRecord {
    pub id: DroneId,
    pub model_name: String,
    pub max_speed: f64,
    pub pilot_count: u64,
}

#[derive(Debug, Clone)]
pub struct NewManufacturer {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct UpdateManufacturer {
    pub name: String,
    pub country: String,
}

#[async_trait]
pub trait ManufacturerRepository: Send + Sync {
    async fn list(
        &self,
        name_filter: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<ListPage<ManufacturerListItem>>;
    async fn find_by_id(
        &self,
        manufacturer_id: ManufacturerId,
    ) -> RepoResult<Option<ManufacturerDetail>>;
    async fn create(&self, new_manufacturer: NewManufacturer) -> RepoResult<ManufacturerRecord>;
    async fn update(
        &self,
        manufacturer_id: ManufacturerId,
        update: UpdateManufacturer,
    ) -> RepoResult<Option<ManufacturerRecord>>;
    /// Deletes the manufacturer and all of its drones (join rows first)
    /// inside one transaction.
    async fn delete(&self, manufacturer_id: ManufacturerId) -> RepoResult<bool>;
}

#[derive(Clone)]
pub struct SeaOrmManufacturerRepository {
    db: DatabaseConnection,
}

impl SeaOrmManufacturerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: manufacturer::Model) -> RepoResult<ManufacturerRecord> {
        let id = ManufacturerId::from_str(&model.id).map_err(|e| {
            RepoError::Corrupt(format!("invalid manufacturer.id '{}': {e}", model.id))
        })?;

        Ok(ManufacturerRecord {
            id,
            name: model.name,
            country: model.country,
        })
    }

    const UNIQUE_FIELDS: &'static [(&'static str, &'static str)] = &[("name", "name")];
}

#[async_trait]
impl ManufacturerRepository for SeaOrmManufacturerRepository {
    async fn list(
        &self,
        name_filter: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<ListPage<ManufacturerListItem>> {
        let mut query = manufacturer::Entity::find().order_by_asc(manufacturer::Column::Name);
        if let Some(needle) = name_filter {
            query = query.filter(contains_insensitive(manufacturer::Column::Name, needle));
        }

        let paginator = query.paginate(&self.db, page.page_size.max(1));
        let total = paginator.num_items().await?;
        let page_count = paginator.num_pages().await?;
        let models = paginator.fetch_page(page.page.max(1) - 1).await?;

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let mut counts: HashMap<String, i64> = HashMap::new();
        if !ids.is_empty() {
            let rows: Vec<(String, i64)> = drone::Entity::find()
                .select_only()
                .column(drone::Column::ManufacturerId)
                .column_as(drone::Column::Id.count(), "drone_count")
                .filter(drone::Column::ManufacturerId.is_in(ids))
                .group_by(drone::Column::ManufacturerId)
                .into_tuple()
                .all(&self.db)
                .await?;
            counts.extend(rows);
        }

        let mut items = Vec::with_capacity(models.len());
        for model in models {
            let drone_count = counts.get(&model.id).copied().unwrap_or(0) as u64;
            items.push(ManufacturerListItem {
                manufacturer: Self::map_model(model)?,
                drone_count,
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

    async fn find_by_id(
        &self,
        manufacturer_id: ManufacturerId,
    ) -> RepoResult<Option<ManufacturerDetail>> {
        let Some(model) = manufacturer::Entity::find_by_id(manufacturer_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let drone_models = drone::Entity::find()
            .filter(drone::Column::ManufacturerId.eq(model.id.clone()))
            .order_by_asc(drone::Column::ModelName)
            .all(&self.db)
            .await?;

        let drone_ids: Vec<String> = drone_models.iter().map(|d| d.id.clone()).collect();
        let mut pilot_counts: HashMap<String, i64> = HashMap::new();
        if !drone_ids.is_empty() {
            let rows: Vec<(String, i64)> = drone_pilot::Entity::find()
                .select_only()
                .column(drone_pilot::Column::DroneId)
                .column_as(drone_pilot::Column::PilotId.count(), "pilot_count")
                .filter(drone_pilot::Column::DroneId.is_in(drone_ids))
                .group_by(drone_pilot::Column::DroneId)
                .into_tuple()
                .all(&self.db)
                .await?;
            pilot_counts.extend(rows);
        }

        let mut drones = Vec::with_capacity(drone_models.len());
        for drone_model in drone_models {
            let id = DroneId::from_str(&drone_model.id).map_err(|e| {
                RepoError::Corrupt(format!("invalid drone.id '{}': {e}", drone_model.id))
            })?;
            let pilot_count = pilot_counts.get(&drone_model.id).copied().unwrap_or(0) as u64;
            drones.push(ManufacturerDroneRecord {
                id,
                model_name: drone_model.model_name,
                max_speed: drone_model.max_speed,
                pilot_count,
            });
        }

        Ok(Some(ManufacturerDetail {
            manufacturer: Self::map_model(model)?,
            drones,
        }))
    }

    async fn create(&self, new_manufacturer: NewManufacturer) -> RepoResult<ManufacturerRecord> {
        let id = ManufacturerId::new();

        let active_model = manufacturer::ActiveModel {
            id: Set(id.to_string()),
            name: Set(new_manufacturer.name),
            country: Set(new_manufacturer.country),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, Self::UNIQUE_FIELDS))?;
        Self::map_model(model)
    }

    async fn update(
        &self,
        manufacturer_id: ManufacturerId,
        update: UpdateManufacturer,
    ) -> RepoResult<Option<ManufacturerRecord>> {
        let Some(model) = manufacturer::Entity::find_by_id(manufacturer_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: manufacturer::ActiveModel = model.into();
        active_model.name = Set(update.name);
        active_model.country = Set(update.country);
        active_model.updated_at = Set(chrono::Utc::now().naive_utc());

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, Self::UNIQUE_FIELDS))?;
        Self::map_model(model).map(Some)
    }

    async fn delete(&self, manufacturer_id: ManufacturerId) -> RepoResult<bool> {
        let txn = self.db.begin().await?;

        let Some(model) = manufacturer::Entity::find_by_id(manufacturer_id.to_string())
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        let drone_ids: Vec<String> = drone::Entity::find()
            .select_only()
            .column(drone::Column::Id)
            .filter(drone::Column::ManufacturerId.eq(model.id.clone()))
            .into_tuple()
            .all(&txn)
            .await?;

        if !drone_ids.is_empty() {
            drone_pilot::Entity::delete_many()
                .filter(drone_pilot::Column::DroneId.is_in(drone_ids.clone()))
                .exec(&txn)
                .await?;
            drone::Entity::delete_many()
                .filter(drone::Column::Id.is_in(drone_ids))
                .exec(&txn)
                .await?;
        }

        manufacturer::Entity::delete_by_id(model.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(true)
    }
}
