mod difficulty;
mod error;
mod ids;
mod license;
mod record_time;
mod skill_rating;

pub use difficulty::TrackDifficulty;
pub use error::DomainError;
pub use ids::{DroneId, ManufacturerId, PilotId, RaceTrackId};
pub use license::DroneLicense;
pub use record_time::RecordTime;
pub use skill_rating::SkillRating;
