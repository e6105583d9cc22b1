use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pilot")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub drone_license: String,
    pub skill_rating: i16,
    pub certification_date: Option<Date>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::drone_pilot::Entity")]
    DronePilot,
}

impl Related<super::drone_pilot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DronePilot.def()
    }
}

impl Related<super::drone::Entity> for Entity {
    fn to() -> RelationDef {
        super::drone_pilot::Relation::Drone.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::drone_pilot::Relation::Pilot.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
