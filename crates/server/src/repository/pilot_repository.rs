use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use racelink_core::domain::{DroneId, DroneLicense, PilotId, SkillRating};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

use crate::entity::{drone, drone_pilot, manufacturer, pilot};
use crate::repository::{
    contains_insensitive, map_unique_violation, ListPage, PageRequest, RepoError, RepoResult,
};

#[derive(Debug, Clone)]
pub struct PilotRecord {
    pub id: PilotId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub drone_license: DroneLicense,
    pub skill_rating: SkillRating,
    pub certification_date: Option<NaiveDate>,
}

/// A pilot with their drones (and each drone's manufacturer) eagerly loaded.
#[derive(Debug, Clone)]
pub struct PilotDetail {
    pub pilot: PilotRecord,
    pub drones: Vec<PilotDroneRecord>,
}

#[derive(Debug, Clone)]
pub struct PilotDroneRecord {
    pub id: DroneId,
    pub model_name: String,
    pub manufacturer_name: String,
}

/// The slice of a pilot row needed to authenticate a login attempt.
#[derive(Debug, Clone)]
pub struct AuthPilotRecord {
    pub id: PilotId,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewPilot {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub drone_license: DroneLicense,
    pub skill_rating: SkillRating,
    pub certification_date: Option<NaiveDate>,
}

/// Full-field replace; the password is never touched by an update.
#[derive(Debug, Clone)]
pub struct UpdatePilot {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub drone_license: DroneLicense,
    pub skill_rating: SkillRating,
    pub certification_date: Option<NaiveDate>,
}

#[async_trait]
pub trait PilotRepository: Send + Sync {
    async fn list(
        &self,
        username_filter: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<ListPage<PilotRecord>>;
    async fn find_by_id(&self, pilot_id: PilotId) -> RepoResult<Option<PilotDetail>>;
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<AuthPilotRecord>>;
    async fn create(&self, new_pilot: NewPilot) -> RepoResult<PilotRecord>;
    async fn update(&self, pilot_id: PilotId, update: UpdatePilot)
        -> RepoResult<Option<PilotRecord>>;
    async fn delete(&self, pilot_id: PilotId) -> RepoResult<bool>;
}

#[derive(Clone)]
pub struct SeaOrmPilotRepository {
    db: DatabaseConnection,
}

impl SeaOrmPilotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: pilot::Model) -> RepoResult<PilotRecord> {
        let id = PilotId::from_str(&model.id)
            .map_err(|e| RepoError::Corrupt(format!("invalid pilot.id '{}': {e}", model.id)))?;
        let drone_license = DroneLicense::new(model.drone_license)
            .map_err(|e| RepoError::Corrupt(format!("invalid pilot.drone_license: {e}")))?;
        let skill_rating = SkillRating::new(model.skill_rating as i32)
            .map_err(|e| RepoError::Corrupt(format!("invalid pilot.skill_rating: {e}")))?;

        Ok(PilotRecord {
            id,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            drone_license,
            skill_rating,
            certification_date: model.certification_date,
        })
    }

    const UNIQUE_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("drone_license", "drone_license"),
        ("username", "username"),
    ];
}

#[async_trait]
impl PilotRepository for SeaOrmPilotRepository {
    async fn list(
        &self,
        username_filter: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<ListPage<PilotRecord>> {
        let mut query = pilot::Entity::find().order_by_asc(pilot::Column::Username);
        if let Some(needle) = username_filter {
            query = query.filter(contains_insensitive(pilot::Column::Username, needle));
        }

        let paginator = query.paginate(&self.db, page.page_size.max(1));
        let total = paginator.num_items().await?;
        let page_count = paginator.num_pages().await?;
        let models = paginator.fetch_page(page.page.max(1) - 1).await?;

        let items = models
            .into_iter()
            .map(Self::map_model)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(ListPage {
            items,
            page: page.page.max(1),
            page_size: page.page_size.max(1),
            page_count,
            total,
        })
    }

    async fn find_by_id(&self, pilot_id: PilotId) -> RepoResult<Option<PilotDetail>> {
        let Some(model) = pilot::Entity::find_by_id(pilot_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let related = model
            .find_related(drone::Entity)
            .find_also_related(manufacturer::Entity)
            .order_by_asc(drone::Column::ModelName)
            .all(&self.db)
            .await?;

        let mut drones = Vec::with_capacity(related.len());
        for (drone_model, maker) in related {
            let id = DroneId::from_str(&drone_model.id).map_err(|e| {
                RepoError::Corrupt(format!("invalid drone.id '{}': {e}", drone_model.id))
            })?;
            drones.push(PilotDroneRecord {
                id,
                model_name: drone_model.model_name,
                manufacturer_name: maker.map(|m| m.name).unwrap_or_default(),
            });
        }

        Ok(Some(PilotDetail {
            pilot: Self::map_model(model)?,
            drones,
        }))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<AuthPilotRecord>> {
        let Some(model) = pilot::Entity::find()
            .filter(pilot::Column::Username.eq(username))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let id = PilotId::from_str(&model.id)
            .map_err(|e| RepoError::Corrupt(format!("invalid pilot.id '{}': {e}", model.id)))?;

        Ok(Some(AuthPilotRecord {
            id,
            username: model.username,
            password_hash: model.password_hash,
        }))
    }

    async fn create(&self, new_pilot: NewPilot) -> RepoResult<PilotRecord> {
        let id = PilotId::new();

        let active_model = pilot::ActiveModel {
            id: Set(id.to_string()),
            username: Set(new_pilot.username),
            first_name: Set(new_pilot.first_name),
            last_name: Set(new_pilot.last_name),
            email: Set(new_pilot.email),
            password_hash: Set(new_pilot.password_hash),
            drone_license: Set(new_pilot.drone_license.into()),
            skill_rating: Set(new_pilot.skill_rating.value() as i16),
            certification_date: Set(new_pilot.certification_date),
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
        pilot_id: PilotId,
        update: UpdatePilot,
    ) -> RepoResult<Option<PilotRecord>> {
        let Some(model) = pilot::Entity::find_by_id(pilot_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: pilot::ActiveModel = model.into();
        active_model.username = Set(update.username);
        active_model.first_name = Set(update.first_name);
        active_model.last_name = Set(update.last_name);
        active_model.email = Set(update.email);
        active_model.drone_license = Set(update.drone_license.into());
        active_model.skill_rating = Set(update.skill_rating.value() as i16);
        active_model.certification_date = Set(update.certification_date);
        active_model.updated_at = Set(chrono::Utc::now().naive_utc());

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, Self::UNIQUE_FIELDS))?;
        Self::map_model(model).map(Some)
    }

    async fn delete(&self, pilot_id: PilotId) -> RepoResult<bool> {
        let txn = self.db.begin().await?;

        let Some(model) = pilot::Entity::find_by_id(pilot_id.to_string())
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        drone_pilot::Entity::delete_many()
            .filter(drone_pilot::Column::PilotId.eq(model.id.clone()))
            .exec(&txn)
            .await?;
        model.delete(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}
