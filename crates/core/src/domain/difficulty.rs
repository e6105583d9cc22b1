use std::fmt;

use super::DomainError;

/// Race track difficulty tier. Stored in the database as a compact
/// numeric code, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackDifficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Professional,
}

impl TrackDifficulty {
    pub fn from_code(code: i16) -> Result<Self, DomainError> {
        match code {
            1 => Ok(Self::Beginner),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::Advanced),
            4 => Ok(Self::Expert),
            5 => Ok(Self::Professional),
            other => Err(DomainError::InvalidDifficulty(other)),
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
            Self::Expert => 4,
            Self::Professional => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
            Self::Professional => "Professional",
        }
    }
}

impl Default for TrackDifficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

impl fmt::Display for TrackDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::TrackDifficulty;

    #[test]
    fn codes_round_trip() {
        for code in 1..=5 {
            let difficulty =
                TrackDifficulty::from_code(code).expect("codes 1-5 should be valid");

            assert_eq!(difficulty.code(), code);
        }
    }

    #[test]
    fn out_of_range_code_is_rejected() {
        assert!(TrackDifficulty::from_code(0).is_err());
        assert!(TrackDifficulty::from_code(6).is_err());
    }

    #[test]
    fn labels_match_tiers() {
        assert_eq!(TrackDifficulty::Beginner.label(), "Beginner");
        assert_eq!(TrackDifficulty::Professional.label(), "Professional");
    }
}
