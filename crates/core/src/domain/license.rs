use std::fmt;

use super::DomainError;

/// A drone racing license: exactly 8 ASCII uppercase letters or digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DroneLicense(String);

impl DroneLicense {
    pub const LEN: usize = 8;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let valid = value.len() == Self::LEN
            && value
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

        if valid {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidLicense(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DroneLicense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DroneLicense> for String {
    fn from(value: DroneLicense) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::DroneLicense;

    #[test]
    fn valid_license_is_created() {
        let license = DroneLicense::new("AB12CD34").expect("AB12CD34 should be valid");

        assert_eq!(license.as_str(), "AB12CD34");
    }

    #[test]
    fn lowercase_license_is_rejected() {
        assert!(DroneLicense::new("ab12cd34").is_err());
    }

    #[test]
    fn short_license_is_rejected() {
        assert!(DroneLicense::new("AB12").is_err());
    }

    #[test]
    fn license_with_symbols_is_rejected() {
        assert!(DroneLicense::new("AB12CD3!").is_err());
    }
}
