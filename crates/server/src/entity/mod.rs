pub mod drone;
pub mod drone_pilot;
pub mod manufacturer;
pub mod pilot;
pub mod race_track;
