//! Explicit per-entity form validation.
//!
//! Every field arrives as text (urlencoded form submission) and is parsed
//! here; all failures for a submission are collected into one
//! `Vec<FieldError>` so the caller can redisplay the whole form.

use chrono::NaiveDate;
use racelink_api_types::FieldError;
use racelink_core::domain::{
    DroneLicense, ManufacturerId, RecordTime, SkillRating, TrackDifficulty,
};
use serde::Deserialize;

const MAX_NAME_LEN: usize = 255;
const MAX_USERNAME_LEN: usize = 150;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct PilotCreateForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub drone_license: String,
    #[serde(default)]
    pub skill_rating: String,
    #[serde(default)]
    pub certification_date: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct PilotUpdateForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub drone_license: String,
    #[serde(default)]
    pub skill_rating: String,
    #[serde(default)]
    pub certification_date: String,
}

#[derive(Debug)]
pub struct ValidatedPilot {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub drone_license: DroneLicense,
    pub skill_rating: SkillRating,
    pub certification_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ManufacturerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug)]
pub struct ValidatedManufacturer {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct DroneForm {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub max_speed: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub manufacturer: String,
}

#[derive(Debug)]
pub struct ValidatedDrone {
    pub model_name: String,
    pub max_speed: f64,
    pub weight_kg: f64,
    pub manufacturer_id: ManufacturerId,
}

#[derive(Debug, Deserialize)]
pub struct RaceTrackForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub difficulty_level: String,
    #[serde(default)]
    pub length_meters: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub record_time: String,
}

#[derive(Debug)]
pub struct ValidatedRaceTrack {
    pub name: String,
    pub difficulty: TrackDifficulty,
    pub length_meters: i32,
    pub location: String,
    pub record_time: Option<RecordTime>,
}

pub fn validate_pilot_create(
    form: &PilotCreateForm,
) -> Result<(ValidatedPilot, String), Vec<FieldError>> {
    let mut errors = Vec::new();
    let pilot = validate_pilot_fields(
        &form.username,
        &form.first_name,
        &form.last_name,
        &form.email,
        &form.drone_license,
        &form.skill_rating,
        &form.certification_date,
        &mut errors,
    );

    if form.password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    } else if form.password != form.password_confirm {
        errors.push(FieldError::new(
            "password_confirm",
            "the two password fields didn't match",
        ));
    }

    match (pilot, errors.is_empty()) {
        (Some(pilot), true) => Ok((pilot, form.password.clone())),
        _ => Err(errors),
    }
}

pub fn validate_pilot_update(form: &PilotUpdateForm) -> Result<ValidatedPilot, Vec<FieldError>> {
    let mut errors = Vec::new();
    let pilot = validate_pilot_fields(
        &form.username,
        &form.first_name,
        &form.last_name,
        &form.email,
        &form.drone_license,
        &form.skill_rating,
        &form.certification_date,
        &mut errors,
    );

    match (pilot, errors.is_empty()) {
        (Some(pilot), true) => Ok(pilot),
        _ => Err(errors),
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_pilot_fields(
    username: &str,
    first_name: &str,
    last_name: &str,
    email: &str,
    drone_license: &str,
    skill_rating: &str,
    certification_date: &str,
    errors: &mut Vec<FieldError>,
) -> Option<ValidatedPilot> {
    let username = required_text(errors, "username", username, MAX_USERNAME_LEN);

    let email = email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", "this field is required"));
    } else if !email.contains('@') {
        errors.push(FieldError::new("email", "enter a valid email address"));
    }

    let drone_license = match DroneLicense::new(drone_license.trim()) {
        Ok(license) => Some(license),
        Err(e) => {
            errors.push(FieldError::new("drone_license", e.to_string()));
            None
        }
    };

    let skill_rating = match skill_rating.trim().parse::<i32>() {
        Ok(value) => match SkillRating::new(value) {
            Ok(rating) => Some(rating),
            Err(e) => {
                errors.push(FieldError::new("skill_rating", e.to_string()));
                None
            }
        },
        Err(_) => {
            errors.push(FieldError::new("skill_rating", "enter a whole number"));
            None
        }
    };

    let certification_date = match optional(certification_date) {
        None => Some(None),
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(Some(date)),
            Err(_) => {
                errors.push(FieldError::new(
                    "certification_date",
                    "enter a valid date (YYYY-MM-DD)",
                ));
                None
            }
        },
    };

    Some(ValidatedPilot {
        username: username?,
        first_name: first_name.trim().to_string(),
        last_name: last_name.trim().to_string(),
        email: email.to_string(),
        drone_license: drone_license?,
        skill_rating: skill_rating?,
        certification_date: certification_date?,
    })
}

pub fn validate_manufacturer(
    form: &ManufacturerForm,
) -> Result<ValidatedManufacturer, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = required_text(&mut errors, "name", &form.name, MAX_NAME_LEN);
    let country = required_text(&mut errors, "country", &form.country, MAX_NAME_LEN);

    match (name, country) {
        (Some(name), Some(country)) if errors.is_empty() => {
            Ok(ValidatedManufacturer { name, country })
        }
        _ => Err(errors),
    }
}

pub fn validate_drone(form: &DroneForm) -> Result<ValidatedDrone, Vec<FieldError>> {
    let mut errors = Vec::new();

    let model_name = required_text(&mut errors, "model_name", &form.model_name, MAX_NAME_LEN);

    // `f64::from_str` accepts "nan" and "inf"; those are not usable values.
    let max_speed = match form.max_speed.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        Ok(value) if value.is_finite() => {
            errors.push(FieldError::new("max_speed", "speed must not be negative"));
            None
        }
        _ => {
            errors.push(FieldError::new("max_speed", "enter a number"));
            None
        }
    };

    let weight_raw = form.weight.trim();
    let weight_kg = match weight_raw.parse::<f64>() {
        Ok(value) if !value.is_finite() => {
            errors.push(FieldError::new("weight", "enter a number"));
            None
        }
        Ok(value) if value < 0.0 => {
            errors.push(FieldError::new("weight", "weight must not be negative"));
            None
        }
        Ok(_) if !has_at_most_two_decimals(weight_raw) => {
            errors.push(FieldError::new(
                "weight",
                "weight supports at most two decimal places",
            ));
            None
        }
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new("weight", "enter a number"));
            None
        }
    };

    let manufacturer_id = match form.manufacturer.trim().parse::<ManufacturerId>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(FieldError::new("manufacturer", "select a manufacturer"));
            None
        }
    };

    match (model_name, max_speed, weight_kg, manufacturer_id) {
        (Some(model_name), Some(max_speed), Some(weight_kg), Some(manufacturer_id))
            if errors.is_empty() =>
        {
            Ok(ValidatedDrone {
                model_name,
                max_speed,
                weight_kg,
                manufacturer_id,
            })
        }
        _ => Err(errors),
    }
}

pub fn validate_race_track(form: &RaceTrackForm) -> Result<ValidatedRaceTrack, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = required_text(&mut errors, "name", &form.name, MAX_NAME_LEN);
    let location = required_text(&mut errors, "location", &form.location, MAX_NAME_LEN);

    let difficulty = match form.difficulty_level.trim().parse::<i16>() {
        Ok(code) => match TrackDifficulty::from_code(code) {
            Ok(difficulty) => Some(difficulty),
            Err(e) => {
                errors.push(FieldError::new("difficulty_level", e.to_string()));
                None
            }
        },
        Err(_) => {
            errors.push(FieldError::new("difficulty_level", "enter a whole number"));
            None
        }
    };

    let length_meters = match form.length_meters.trim().parse::<i32>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new("length_meters", "enter a whole number"));
            None
        }
    };

    let record_time = match optional(&form.record_time) {
        None => Some(None),
        Some(raw) => match raw.parse::<RecordTime>() {
            Ok(time) => Some(Some(time)),
            Err(e) => {
                errors.push(FieldError::new("record_time", e.to_string()));
                None
            }
        },
    };

    match (name, location, difficulty, length_meters, record_time) {
        (Some(name), Some(location), Some(difficulty), Some(length_meters), Some(record_time))
            if errors.is_empty() =>
        {
            Ok(ValidatedRaceTrack {
                name,
                difficulty,
                length_meters,
                location,
                record_time,
            })
        }
        _ => Err(errors),
    }
}

fn required_text(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, "this field is required"));
        return None;
    }
    if value.len() > max_len {
        errors.push(FieldError::new(
            field,
            format!("ensure this value has at most {max_len} characters"),
        ));
        return None;
    }
    Some(value.to_string())
}

fn optional(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn has_at_most_two_decimals(raw: &str) -> bool {
    match raw.split_once('.') {
        None => true,
        Some((_, fraction)) => fraction.len() <= 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_pilot_form() -> PilotCreateForm {
        PilotCreateForm {
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            email: "alice@example.com".to_string(),
            drone_license: "AB12CD34".to_string(),
            skill_rating: "42".to_string(),
            certification_date: "2025-06-01".to_string(),
            password: "hunter2hunter2".to_string(),
            password_confirm: "hunter2hunter2".to_string(),
        }
    }

    #[test]
    fn valid_pilot_form_passes() {
        let (pilot, password) =
            validate_pilot_create(&valid_pilot_form()).expect("form should validate");

        assert_eq!(pilot.username, "alice");
        assert_eq!(pilot.drone_license.as_str(), "AB12CD34");
        assert_eq!(pilot.skill_rating.value(), 42);
        assert_eq!(password, "hunter2hunter2");
    }

    #[test]
    fn bad_license_and_rating_are_both_reported() {
        let mut form = valid_pilot_form();
        form.drone_license = "abc".to_string();
        form.skill_rating = "250".to_string();

        let errors = validate_pilot_create(&form).expect_err("form should fail");
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"drone_license"));
        assert!(fields.contains(&"skill_rating"));
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let mut form = valid_pilot_form();
        form.password_confirm = "something-else".to_string();

        let errors = validate_pilot_create(&form).expect_err("form should fail");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password_confirm");
    }

    #[test]
    fn empty_certification_date_is_none() {
        let mut form = valid_pilot_form();
        form.certification_date = "".to_string();

        let (pilot, _) = validate_pilot_create(&form).expect("form should validate");

        assert!(pilot.certification_date.is_none());
    }

    #[test]
    fn drone_weight_with_three_decimals_is_rejected() {
        let form = DroneForm {
            model_name: "Phantom X100".to_string(),
            max_speed: "120.5".to_string(),
            weight: "1.234".to_string(),
            manufacturer: racelink_core::domain::ManufacturerId::new().to_string(),
        };

        let errors = validate_drone(&form).expect_err("form should fail");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "weight");
    }

    #[test]
    fn negative_drone_speed_is_rejected() {
        let form = DroneForm {
            model_name: "Phantom X100".to_string(),
            max_speed: "-3".to_string(),
            weight: "1.2".to_string(),
            manufacturer: racelink_core::domain::ManufacturerId::new().to_string(),
        };

        let errors = validate_drone(&form).expect_err("form should fail");

        assert_eq!(errors[0].field, "max_speed");
    }

    #[test]
    fn non_finite_drone_numbers_are_rejected() {
        for (speed, weight) in [("nan", "1.2"), ("inf", "1.2"), ("120", "nan"), ("120", "inf")] {
            let form = DroneForm {
                model_name: "Phantom X100".to_string(),
                max_speed: speed.to_string(),
                weight: weight.to_string(),
                manufacturer: racelink_core::domain::ManufacturerId::new().to_string(),
            };

            let errors = validate_drone(&form)
                .expect_err(&format!("speed {speed} / weight {weight} should fail"));

            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].message, "enter a number");
        }
    }

    #[test]
    fn race_track_record_time_parses() {
        let form = RaceTrackForm {
            name: "Sky Loop".to_string(),
            difficulty_level: "3".to_string(),
            length_meters: "1200".to_string(),
            location: "Hangar 9".to_string(),
            record_time: "00:01:45".to_string(),
        };

        let track = validate_race_track(&form).expect("form should validate");

        assert_eq!(track.difficulty, TrackDifficulty::Advanced);
        assert_eq!(track.record_time.expect("record time set").seconds(), 105);
    }

    #[test]
    fn race_track_difficulty_out_of_range_is_rejected() {
        let form = RaceTrackForm {
            name: "Sky Loop".to_string(),
            difficulty_level: "6".to_string(),
            length_meters: "1200".to_string(),
            location: "Hangar 9".to_string(),
            record_time: String::new(),
        };

        let errors = validate_race_track(&form).expect_err("form should fail");

        assert_eq!(errors[0].field, "difficulty_level");
    }

    #[test]
    fn manufacturer_requires_both_fields() {
        let form = ManufacturerForm {
            name: String::new(),
            country: String::new(),
        };

        let errors = validate_manufacturer(&form).expect_err("form should fail");

        assert_eq!(errors.len(), 2);
    }
}
