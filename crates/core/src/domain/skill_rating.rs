use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SkillRating(u8);

impl SkillRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    pub fn new(value: i32) -> Result<Self, DomainError> {
        if (Self::MIN as i32..=Self::MAX as i32).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::InvalidSkillRating(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for SkillRating {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<i32> for SkillRating {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SkillRating> for u8 {
    fn from(value: SkillRating) -> Self {
        value.value()
    }
}

#[cfg(test)]
mod tests {
    use super::SkillRating;

    #[test]
    fn bounds_are_accepted() {
        assert_eq!(SkillRating::new(1).expect("1 is valid").value(), 1);
        assert_eq!(SkillRating::new(100).expect("100 is valid").value(), 100);
    }

    #[test]
    fn zero_rating_is_rejected() {
        let err = SkillRating::new(0).expect_err("0 should be rejected");

        assert_eq!(
            err.to_string(),
            "invalid skill rating: 0. rating must be in [1, 100]"
        );
    }

    #[test]
    fn oversized_rating_is_rejected() {
        assert!(SkillRating::new(101).is_err());
    }
}
