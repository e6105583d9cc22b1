use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pilot::Table)
                    .if_not_exists()
                    .col(string_len(Pilot::Id, 36).primary_key())
                    .col(string_len(Pilot::Username, 150).unique_key())
                    .col(string_len(Pilot::FirstName, 150).default(""))
                    .col(string_len(Pilot::LastName, 150).default(""))
                    .col(string_len(Pilot::Email, 255))
                    .col(string_len(Pilot::PasswordHash, 255))
                    // License format (8 uppercase alphanumerics) is enforced in
                    // app code; the database only pins the width.
                    .col(string_len(Pilot::DroneLicense, 8).unique_key())
                    .col(
                        small_integer(Pilot::SkillRating)
                            .default(1)
                            .check(Expr::col(Pilot::SkillRating).gte(1))
                            .check(Expr::col(Pilot::SkillRating).lte(100)),
                    )
                    .col(date_null(Pilot::CertificationDate))
                    .col(timestamp(Pilot::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Pilot::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Manufacturer::Table)
                    .if_not_exists()
                    .col(string_len(Manufacturer::Id, 36).primary_key())
                    .col(string_len(Manufacturer::Name, 255).unique_key())
                    .col(string_len(Manufacturer::Country, 255))
                    .col(timestamp(Manufacturer::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Manufacturer::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Drone::Table)
                    .if_not_exists()
                    .col(string_len(Drone::Id, 36).primary_key())
                    .col(string_len(Drone::ModelName, 255))
                    // km/h
                    .col(double(Drone::MaxSpeed).check(Expr::col(Drone::MaxSpeed).gte(0.0)))
                    // kg
                    .col(double(Drone::WeightKg).check(Expr::col(Drone::WeightKg).gte(0.0)))
                    .col(string_len(Drone::ManufacturerId, 36))
                    .col(timestamp(Drone::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Drone::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-drone-manufacturer_id")
                            .from(Drone::Table, Drone::ManufacturerId)
                            .to(Manufacturer::Table, Manufacturer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_drone_model_name_manufacturer_id")
                    .table(Drone::Table)
                    .col(Drone::ModelName)
                    .col(Drone::ManufacturerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_drone_manufacturer_id")
                    .table(Drone::Table)
                    .col(Drone::ManufacturerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RaceTrack::Table)
                    .if_not_exists()
                    .col(string_len(RaceTrack::Id, 36).primary_key())
                    .col(string_len(RaceTrack::Name, 255).unique_key())
                    // Difficulty enum is represented in app code. DB stores compact numeric code.
                    // 1=beginner, 2=intermediate, 3=advanced, 4=expert, 5=professional
                    .col(
                        small_integer(RaceTrack::Difficulty)
                            .default(1)
                            .check(Expr::col(RaceTrack::Difficulty).gte(1))
                            .check(Expr::col(RaceTrack::Difficulty).lte(5)),
                    )
                    .col(integer(RaceTrack::LengthMeters))
                    .col(string_len(RaceTrack::Location, 255))
                    .col(
                        integer_null(RaceTrack::RecordTimeSeconds)
                            .check(Expr::col(RaceTrack::RecordTimeSeconds).gte(0)),
                    )
                    .col(timestamp(RaceTrack::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(RaceTrack::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DronePilot::Table)
                    .if_not_exists()
                    .col(string_len(DronePilot::DroneId, 36))
                    .col(string_len(DronePilot::PilotId, 36))
                    .primary_key(
                        Index::create()
                            .col(DronePilot::DroneId)
                            .col(DronePilot::PilotId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-drone_pilot-drone_id")
                            .from(DronePilot::Table, DronePilot::DroneId)
                            .to(Drone::Table, Drone::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-drone_pilot-pilot_id")
                            .from(DronePilot::Table, DronePilot::PilotId)
                            .to(Pilot::Table, Pilot::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_drone_pilot_pilot_id")
                    .table(DronePilot::Table)
                    .col(DronePilot::PilotId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DronePilot::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(RaceTrack::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Drone::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Manufacturer::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Pilot::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Pilot {
    Table,
    Id,
    Username,
    FirstName,
    LastName,
    Email,
    PasswordHash,
    DroneLicense,
    SkillRating,
    CertificationDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Manufacturer {
    Table,
    Id,
    Name,
    Country,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Drone {
    Table,
    Id,
    ModelName,
    MaxSpeed,
    WeightKg,
    ManufacturerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RaceTrack {
    Table,
    Id,
    Name,
    Difficulty,
    LengthMeters,
    Location,
    RecordTimeSeconds,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DronePilot {
    Table,
    DroneId,
    PilotId,
}
