//! Repository-level integration tests against an in-memory SQLite database
//! with the real migrations applied.

use racelink_core::domain::{DroneLicense, SkillRating, TrackDifficulty};
use racelink_migration::{Migrator, MigratorTrait};
use racelink_server::repository::{
    DroneRepository, ManufacturerRepository, NewDrone, NewManufacturer, NewPilot, NewRaceTrack,
    PageRequest, PilotRepository, RaceTrackRepository, RepoError, SeaOrmDroneRepository,
    SeaOrmManufacturerRepository, SeaOrmPilotRepository, SeaOrmRaceTrackRepository,
    SeaOrmStatsRepository, StatsRepository, ToggleOutcome, UpdateDrone,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

async fn test_db() -> DatabaseConnection {
    // A single pooled connection keeps every query on the same in-memory db.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("sqlite should connect");
    Migrator::up(&db, None).await.expect("migrations should run");
    db
}

fn page(n: u64) -> PageRequest {
    PageRequest {
        page: n,
        page_size: 5,
    }
}

fn new_pilot(username: &str, license: &str, rating: i32) -> NewPilot {
    NewPilot {
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "Pilot".to_string(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$fake".to_string(),
        drone_license: DroneLicense::new(license).expect("license should be valid"),
        skill_rating: SkillRating::new(rating).expect("rating should be valid"),
        certification_date: None,
    }
}

fn new_drone(model_name: &str, manufacturer: &racelink_server::repository::ManufacturerRecord) -> NewDrone {
    NewDrone {
        model_name: model_name.to_string(),
        max_speed: 120.0,
        weight_kg: 1.25,
        manufacturer_id: manufacturer.id,
    }
}

#[tokio::test]
async fn test_pilot_crud_round_trip() {
    let db = test_db().await;
    let pilots = SeaOrmPilotRepository::new(db);

    let created = pilots
        .create(new_pilot("maverick", "ABCD1234", 88))
        .await
        .expect("create should succeed");
    assert_eq!(created.username, "maverick");
    assert_eq!(created.skill_rating.value(), 88);

    let detail = pilots
        .find_by_id(created.id)
        .await
        .expect("lookup should succeed")
        .expect("pilot should exist");
    assert_eq!(detail.pilot.username, "maverick");
    assert!(detail.drones.is_empty());

    let auth = pilots
        .find_by_username("maverick")
        .await
        .expect("lookup should succeed")
        .expect("pilot should exist");
    assert_eq!(auth.id, created.id);
    assert_eq!(auth.password_hash, "$argon2id$fake");

    assert!(pilots.delete(created.id).await.expect("delete should succeed"));
    assert!(pilots
        .find_by_id(created.id)
        .await
        .expect("lookup should succeed")
        .is_none());
}

#[tokio::test]
async fn test_duplicate_username_reports_field() {
    let db = test_db().await;
    let pilots = SeaOrmPilotRepository::new(db);

    pilots
        .create(new_pilot("ace", "AAAA1111", 50))
        .await
        .expect("first create should succeed");

    let err = pilots
        .create(new_pilot("ace", "BBBB2222", 60))
        .await
        .expect_err("duplicate username should be rejected");
    match err {
        RepoError::Duplicate { field } => assert_eq!(field, "username"),
        other => panic!("expected Duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_license_reports_field() {
    let db = test_db().await;
    let pilots = SeaOrmPilotRepository::new(db);

    pilots
        .create(new_pilot("first", "SAME0001", 50))
        .await
        .expect("first create should succeed");

    let err = pilots
        .create(new_pilot("second", "SAME0001", 60))
        .await
        .expect_err("duplicate license should be rejected");
    match err {
        RepoError::Duplicate { field } => assert_eq!(field, "drone_license"),
        other => panic!("expected Duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pilot_list_filters_case_insensitively() {
    let db = test_db().await;
    let pilots = SeaOrmPilotRepository::new(db);

    for (name, license) in [
        ("SkyRacer", "LIC00001"),
        ("nightsky", "LIC00002"),
        ("groundhog", "LIC00003"),
    ] {
        pilots
            .create(new_pilot(name, license, 40))
            .await
            .expect("create should succeed");
    }

    let all = pilots.list(None, page(1)).await.expect("list should succeed");
    assert_eq!(all.total, 3);

    let matched = pilots
        .list(Some("SKY"), page(1))
        .await
        .expect("list should succeed");
    assert_eq!(matched.total, 2);
    let names: Vec<_> = matched.items.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, vec!["SkyRacer", "nightsky"]);
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let db = test_db().await;
    let pilots = SeaOrmPilotRepository::new(db);

    for i in 0..7 {
        pilots
            .create(new_pilot(&format!("pilot{i}"), &format!("PAGE000{i}"), 30))
            .await
            .expect("create should succeed");
    }

    let first = pilots.list(None, page(1)).await.expect("list should succeed");
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.page_count, 2);
    assert_eq!(first.total, 7);

    let second = pilots.list(None, page(2)).await.expect("list should succeed");
    assert_eq!(second.items.len(), 2);

    let past_end = pilots.list(None, page(9)).await.expect("list should succeed");
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 7);
}

#[tokio::test]
async fn test_duplicate_model_per_manufacturer_rejected() {
    let db = test_db().await;
    let manufacturers = SeaOrmManufacturerRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db);

    let aerotech = manufacturers
        .create(NewManufacturer {
            name: "AeroTech Corp".to_string(),
            country: "Germany".to_string(),
        })
        .await
        .expect("create should succeed");
    let rival = manufacturers
        .create(NewManufacturer {
            name: "VoltWing".to_string(),
            country: "Japan".to_string(),
        })
        .await
        .expect("create should succeed");

    drones
        .create(new_drone("Phantom X100", &aerotech))
        .await
        .expect("create should succeed");

    let err = drones
        .create(new_drone("Phantom X100", &aerotech))
        .await
        .expect_err("same model under same manufacturer should be rejected");
    match err {
        RepoError::Duplicate { field } => assert_eq!(field, "model_name"),
        other => panic!("expected Duplicate, got {other:?}"),
    }

    // Same model name under a different manufacturer is fine.
    drones
        .create(new_drone("Phantom X100", &rival))
        .await
        .expect("create under another manufacturer should succeed");
}

#[tokio::test]
async fn test_drone_list_filters_by_model_name() {
    let db = test_db().await;
    let manufacturers = SeaOrmManufacturerRepository::new(db.clone());
    let pilots = SeaOrmPilotRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db);

    let aerotech = manufacturers
        .create(NewManufacturer {
            name: "AeroTech Corp".to_string(),
            country: "Germany".to_string(),
        })
        .await
        .expect("create should succeed");
    let phantom = drones
        .create(new_drone("Phantom X100", &aerotech))
        .await
        .expect("create should succeed");
    drones
        .create(new_drone("Falcon 9K", &aerotech))
        .await
        .expect("create should succeed");
    let pilot = pilots
        .create(new_pilot("maverick", "SRCH0001", 75))
        .await
        .expect("create should succeed");
    drones
        .toggle_pilot(phantom.id, pilot.id)
        .await
        .expect("toggle should succeed");

    let matched = drones
        .list(Some("Phantom"), page(1))
        .await
        .expect("list should succeed");
    assert_eq!(matched.total, 1);
    assert_eq!(matched.items.len(), 1);
    let item = &matched.items[0];
    assert_eq!(item.drone.id, phantom.id);
    assert_eq!(item.drone.model_name, "Phantom X100");
    assert_eq!(item.manufacturer_name, "AeroTech Corp");
    assert_eq!(item.pilot_ids, vec![pilot.id]);

    // Matching is case-insensitive; the full list still has both drones.
    let lower = drones
        .list(Some("phantom"), page(1))
        .await
        .expect("list should succeed");
    assert_eq!(lower.total, 1);
    let all = drones.list(None, page(1)).await.expect("list should succeed");
    assert_eq!(all.total, 2);
}

#[tokio::test]
async fn test_drone_update_to_unknown_manufacturer_rejected() {
    let db = test_db().await;
    let manufacturers = SeaOrmManufacturerRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db);

    let maker = manufacturers
        .create(NewManufacturer {
            name: "AeroTech Corp".to_string(),
            country: "Germany".to_string(),
        })
        .await
        .expect("create should succeed");
    let drone = drones
        .create(new_drone("Falcon 9K", &maker))
        .await
        .expect("create should succeed");

    let err = drones
        .update(
            drone.id,
            UpdateDrone {
                model_name: "Falcon 9K".to_string(),
                max_speed: 130.0,
                weight_kg: 1.1,
                manufacturer_id: racelink_core::domain::ManufacturerId::new(),
            },
        )
        .await
        .expect_err("unknown manufacturer should be rejected");
    match err {
        RepoError::UnknownReference { entity, .. } => assert_eq!(entity, "manufacturer"),
        other => panic!("expected UnknownReference, got {other:?}"),
    }
}

#[tokio::test]
async fn test_toggle_assignment_round_trip() {
    let db = test_db().await;
    let manufacturers = SeaOrmManufacturerRepository::new(db.clone());
    let pilots = SeaOrmPilotRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db);

    let maker = manufacturers
        .create(NewManufacturer {
            name: "AeroTech Corp".to_string(),
            country: "Germany".to_string(),
        })
        .await
        .expect("create should succeed");
    let drone = drones
        .create(new_drone("Phantom X100", &maker))
        .await
        .expect("create should succeed");
    let pilot = pilots
        .create(new_pilot("maverick", "TOGG0001", 90))
        .await
        .expect("create should succeed");

    let first = drones
        .toggle_pilot(drone.id, pilot.id)
        .await
        .expect("toggle should succeed");
    assert_eq!(first, ToggleOutcome::Assigned);

    let detail = drones
        .find_by_id(drone.id)
        .await
        .expect("lookup should succeed")
        .expect("drone should exist");
    assert_eq!(detail.pilots.len(), 1);
    assert_eq!(detail.pilots[0].username, "maverick");

    let second = drones
        .toggle_pilot(drone.id, pilot.id)
        .await
        .expect("toggle should succeed");
    assert_eq!(second, ToggleOutcome::Unassigned);

    let detail = drones
        .find_by_id(drone.id)
        .await
        .expect("lookup should succeed")
        .expect("drone should exist");
    assert!(detail.pilots.is_empty());
}

#[tokio::test]
async fn test_toggle_missing_drone_is_not_found() {
    let db = test_db().await;
    let pilots = SeaOrmPilotRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db);

    let pilot = pilots
        .create(new_pilot("ghost", "GHOST001", 10))
        .await
        .expect("create should succeed");

    let err = drones
        .toggle_pilot(racelink_core::domain::DroneId::new(), pilot.id)
        .await
        .expect_err("missing drone should fail");
    match err {
        RepoError::NotFound { entity } => assert_eq!(entity, "drone"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_manufacturer_delete_cascades_to_drones_only() {
    let db = test_db().await;
    let manufacturers = SeaOrmManufacturerRepository::new(db.clone());
    let pilots = SeaOrmPilotRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db);

    let maker = manufacturers
        .create(NewManufacturer {
            name: "AeroTech Corp".to_string(),
            country: "Germany".to_string(),
        })
        .await
        .expect("create should succeed");
    let drone = drones
        .create(new_drone("Phantom X100", &maker))
        .await
        .expect("create should succeed");
    let pilot = pilots
        .create(new_pilot("maverick", "CASC0001", 70))
        .await
        .expect("create should succeed");
    drones
        .toggle_pilot(drone.id, pilot.id)
        .await
        .expect("toggle should succeed");

    assert!(manufacturers
        .delete(maker.id)
        .await
        .expect("delete should succeed"));

    // Drone and assignment rows are gone, the pilot survives.
    assert!(drones
        .find_by_id(drone.id)
        .await
        .expect("lookup should succeed")
        .is_none());
    let detail = pilots
        .find_by_id(pilot.id)
        .await
        .expect("lookup should succeed")
        .expect("pilot should survive");
    assert!(detail.drones.is_empty());
}

#[tokio::test]
async fn test_drone_delete_leaves_manufacturer_and_pilots() {
    let db = test_db().await;
    let manufacturers = SeaOrmManufacturerRepository::new(db.clone());
    let pilots = SeaOrmPilotRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db);

    let maker = manufacturers
        .create(NewManufacturer {
            name: "AeroTech Corp".to_string(),
            country: "Germany".to_string(),
        })
        .await
        .expect("create should succeed");
    let drone = drones
        .create(new_drone("Phantom X100", &maker))
        .await
        .expect("create should succeed");
    let pilot = pilots
        .create(new_pilot("survivor", "SURV0001", 55))
        .await
        .expect("create should succeed");
    drones
        .toggle_pilot(drone.id, pilot.id)
        .await
        .expect("toggle should succeed");

    assert!(drones.delete(drone.id).await.expect("delete should succeed"));

    assert!(manufacturers
        .find_by_id(maker.id)
        .await
        .expect("lookup should succeed")
        .is_some());
    assert!(pilots
        .find_by_id(pilot.id)
        .await
        .expect("lookup should succeed")
        .is_some());
}

#[tokio::test]
async fn test_manufacturer_list_counts_drones() {
    let db = test_db().await;
    let manufacturers = SeaOrmManufacturerRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db);

    let busy = manufacturers
        .create(NewManufacturer {
            name: "AeroTech Corp".to_string(),
            country: "Germany".to_string(),
        })
        .await
        .expect("create should succeed");
    let idle = manufacturers
        .create(NewManufacturer {
            name: "VoltWing".to_string(),
            country: "Japan".to_string(),
        })
        .await
        .expect("create should succeed");
    drones
        .create(new_drone("Phantom X100", &busy))
        .await
        .expect("create should succeed");
    drones
        .create(new_drone("Falcon 9K", &busy))
        .await
        .expect("create should succeed");

    let listing = manufacturers
        .list(None, page(1))
        .await
        .expect("list should succeed");
    let by_name: Vec<_> = listing
        .items
        .iter()
        .map(|m| (m.manufacturer.name.as_str(), m.drone_count))
        .collect();
    assert!(by_name.contains(&("AeroTech Corp", 2)));
    assert!(by_name.contains(&("VoltWing", 0)));
    let _ = idle;
}

#[tokio::test]
async fn test_race_track_crud_and_ordering() {
    let db = test_db().await;
    let tracks = SeaOrmRaceTrackRepository::new(db);

    for (name, difficulty, time) in [
        ("Zephyr Loop", 4, Some("00:02:30")),
        ("Alpine Run", 4, None),
        ("Beginner Bowl", 1, Some("00:05:00")),
    ] {
        tracks
            .create(NewRaceTrack {
                name: name.to_string(),
                difficulty: TrackDifficulty::from_code(difficulty).expect("valid difficulty"),
                length_meters: 800,
                location: "Test Valley".to_string(),
                record_time: time.map(|t| t.parse().expect("valid time")),
            })
            .await
            .expect("create should succeed");
    }

    let listing = tracks.list(None, page(1)).await.expect("list should succeed");
    let names: Vec<_> = listing.items.iter().map(|t| t.name.as_str()).collect();
    // Easier tracks first, names break ties.
    assert_eq!(names, vec!["Beginner Bowl", "Alpine Run", "Zephyr Loop"]);

    let zephyr = listing
        .items
        .iter()
        .find(|t| t.name == "Zephyr Loop")
        .expect("track should be listed");
    assert_eq!(
        zephyr.record_time.map(|t| t.to_string()),
        Some("00:02:30".to_string())
    );

    let err = tracks
        .create(NewRaceTrack {
            name: "Zephyr Loop".to_string(),
            difficulty: TrackDifficulty::from_code(2).expect("valid difficulty"),
            length_meters: 500,
            location: "Elsewhere".to_string(),
            record_time: None,
        })
        .await
        .expect_err("duplicate track name should be rejected");
    match err {
        RepoError::Duplicate { field } => assert_eq!(field, "name"),
        other => panic!("expected Duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dashboard_counts_and_rankings() {
    let db = test_db().await;
    let manufacturers = SeaOrmManufacturerRepository::new(db.clone());
    let pilots = SeaOrmPilotRepository::new(db.clone());
    let drones = SeaOrmDroneRepository::new(db.clone());
    let stats = SeaOrmStatsRepository::new(db);

    let maker = manufacturers
        .create(NewManufacturer {
            name: "AeroTech Corp".to_string(),
            country: "Germany".to_string(),
        })
        .await
        .expect("create should succeed");
    let popular = drones
        .create(new_drone("Phantom X100", &maker))
        .await
        .expect("create should succeed");
    let lonely = drones
        .create(new_drone("Falcon 9K", &maker))
        .await
        .expect("create should succeed");

    let mut pilot_ids = Vec::new();
    for (i, rating) in [60, 95, 80].into_iter().enumerate() {
        let p = pilots
            .create(new_pilot(&format!("pilot{i}"), &format!("DASH000{i}"), rating))
            .await
            .expect("create should succeed");
        pilot_ids.push(p.id);
    }
    for id in &pilot_ids {
        drones
            .toggle_pilot(popular.id, *id)
            .await
            .expect("toggle should succeed");
    }
    drones
        .toggle_pilot(lonely.id, pilot_ids[0])
        .await
        .expect("toggle should succeed");

    let dashboard = stats.dashboard().await.expect("stats should succeed");
    assert_eq!(dashboard.num_pilots, 3);
    assert_eq!(dashboard.num_drones, 2);
    assert_eq!(dashboard.num_manufacturers, 1);
    assert_eq!(dashboard.num_race_tracks, 0);

    assert_eq!(dashboard.top_pilots[0].username, "pilot1");
    assert_eq!(dashboard.top_pilots[0].skill_rating.value(), 95);
    assert_eq!(dashboard.top_pilots[1].username, "pilot2");

    assert_eq!(dashboard.popular_drones[0].model_name, "Phantom X100");
    assert_eq!(dashboard.popular_drones[0].pilot_count, 3);
}
