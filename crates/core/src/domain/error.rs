use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(
        "invalid drone license '{0}'. license must be exactly 8 uppercase letters or digits"
    )]
    InvalidLicense(String),

    #[error("invalid skill rating: {0}. rating must be in [1, 100]")]
    InvalidSkillRating(i32),

    #[error("invalid track difficulty code: {0}. difficulty must be in [1, 5]")]
    InvalidDifficulty(i16),

    #[error("invalid record time '{0}'. expected HH:MM:SS")]
    InvalidRecordTime(String),

    #[error("record time must not be negative: {0} seconds")]
    NegativeRecordTime(i64),
}
