use std::str::FromStr;

use async_trait::async_trait;
use racelink_core::domain::{RaceTrackId, RecordTime, TrackDifficulty};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::entity::race_track;
use crate::repository::{
    contains_insensitive, map_unique_violation, ListPage, PageRequest, RepoError, RepoResult,
};

#[derive(Debug, Clone)]
pub struct RaceTrackRecord {
    pub id: RaceTrackId,
    pub name: String,
    pub difficulty: TrackDifficulty,
    pub length_meters: i32,
    pub location: String,
    pub record_time: Option<RecordTime>,
}

#[derive(Debug, Clone)]
pub struct NewRaceTrack {
    pub name: String,
    pub difficulty: TrackDifficulty,
    pub length_meters: i32,
    pub location: String,
    pub record_time: Option<RecordTime>,
}

#[derive(Debug, Clone)]
pub struct UpdateRaceTrack {
    pub name: String,
    pub difficulty: TrackDifficulty,
    pub length_meters: i32,
    pub location: String,
    pub record_time: Option<RecordTime>,
}

#[async_trait]
pub trait RaceTrackRepository: Send + Sync {
    async fn list(
        &self,
        name_filter: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<ListPage<RaceTrackRecord>>;
    async fn find_by_id(&self, track_id: RaceTrackId) -> RepoResult<Option<RaceTrackRecord>>;
    async fn create(&self, new_track: NewRaceTrack) -> RepoResult<RaceTrackRecord>;
    async fn update(
        &self,
        track_id: RaceTrackId,
        update: UpdateRaceTrack,
    ) -> RepoResult<Option<RaceTrackRecord>>;
    async fn delete(&self, track_id: RaceTrackId) -> RepoResult<bool>;
}

#[derive(Clone)]
pub struct SeaOrmRaceTrackRepository {
    db: DatabaseConnection,
}

impl SeaOrmRaceTrackRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: race_track::Model) -> RepoResult<RaceTrackRecord> {
        let id = RaceTrackId::from_str(&model.id).map_err(|e| {
            RepoError::Corrupt(format!("invalid race_track.id '{}': {e}", model.id))
        })?;
        let difficulty = TrackDifficulty::from_code(model.difficulty)
            .map_err(|e| RepoError::Corrupt(format!("invalid race_track.difficulty: {e}")))?;
        let record_time = model
            .record_time_seconds
            .map(|seconds| RecordTime::from_seconds(seconds as i64))
            .transpose()
            .map_err(|e| RepoError::Corrupt(format!("invalid race_track.record_time: {e}")))?;

        Ok(RaceTrackRecord {
            id,
            name: model.name,
            difficulty,
            length_meters: model.length_meters,
            location: model.location,
            record_time,
        })
    }

    const UNIQUE_FIELDS: &'static [(&'static str, &'static str)] = &[("name", "name")];
}

#[async_trait]
impl RaceTrackRepository for SeaOrmRaceTrackRepository {
    async fn list(
        &self,
        name_filter: Option<&str>,
        page: PageRequest,
    ) -> RepoResult<ListPage<RaceTrackRecord>> {
        // Tracks sort by difficulty tier first, then name.
        let mut query = race_track::Entity::find()
            .order_by_asc(race_track::Column::Difficulty)
            .order_by_asc(race_track::Column::Name);
        if let Some(needle) = name_filter {
            query = query.filter(contains_insensitive(race_track::Column::Name, needle));
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

    async fn find_by_id(&self, track_id: RaceTrackId) -> RepoResult<Option<RaceTrackRecord>> {
        let model = race_track::Entity::find_by_id(track_id.to_string())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn create(&self, new_track: NewRaceTrack) -> RepoResult<RaceTrackRecord> {
        let id = RaceTrackId::new();

        let active_model = race_track::ActiveModel {
            id: Set(id.to_string()),
            name: Set(new_track.name),
            difficulty: Set(new_track.difficulty.code()),
            length_meters: Set(new_track.length_meters),
            location: Set(new_track.location),
            record_time_seconds: Set(new_track.record_time.map(|t| t.seconds() as i32)),
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
        track_id: RaceTrackId,
        update: UpdateRaceTrack,
    ) -> RepoResult<Option<RaceTrackRecord>> {
        let Some(model) = race_track::Entity::find_by_id(track_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: race_track::ActiveModel = model.into();
        active_model.name = Set(update.name);
        active_model.difficulty = Set(update.difficulty.code());
        active_model.length_meters = Set(update.length_meters);
        active_model.location = Set(update.location);
        active_model.record_time_seconds = Set(update.record_time.map(|t| t.seconds() as i32));
        active_model.updated_at = Set(chrono::Utc::now().naive_utc());

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, Self::UNIQUE_FIELDS))?;
        Self::map_model(model).map(Some)
    }

    async fn delete(&self, track_id: RaceTrackId) -> RepoResult<bool> {
        let result = race_track::Entity::delete_by_id(track_id.to_string())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
