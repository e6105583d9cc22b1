use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "drone")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub model_name: String,
    pub max_speed: f64,
    pub weight_kg: f64,
    pub manufacturer_id: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::manufacturer::Entity",
        from = "Column::ManufacturerId",
        to = "super::manufacturer::Column::Id",
        on_delete = "Cascade"
    )]
    Manufacturer,
    #[sea_orm(has_many = "super::drone_pilot::Entity")]
    DronePilot,
}

impl Related<super::manufacturer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Manufacturer.def()
    }
}

impl Related<super::drone_pilot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DronePilot.def()
    }
}

impl Related<super::pilot::Entity> for Entity {
    fn to() -> RelationDef {
        super::drone_pilot::Relation::Pilot.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::drone_pilot::Relation::Drone.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
