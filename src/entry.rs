// 👶 Guess Entries - raw records, parsed guesses and the actual outcome
//
// Records are stored as text and parsed lazily, so a malformed row in the
// store never blocks reading the rest.

use crate::error::{Result, TombolaError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used in forms and in the store
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column order of the persisted file
pub const HEADER: [&str; 5] = ["Name", "DateOfBirth", "Length", "Weight", "Gender"];

// ============================================================================
// RAW RECORD (what the store holds)
// ============================================================================

/// One persisted guess, every field kept as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "DateOfBirth")]
    pub date_of_birth: String,

    #[serde(rename = "Length")]
    pub length: String,

    #[serde(rename = "Weight")]
    pub weight: String,

    #[serde(rename = "Gender")]
    pub gender: String,
}

impl GuessRecord {
    pub fn new(
        name: impl Into<String>,
        date_of_birth: impl Into<String>,
        length: impl Into<String>,
        weight: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date_of_birth: date_of_birth.into(),
            length: length.into(),
            weight: weight.into(),
            gender: gender.into(),
        }
    }

    /// Parse every field; the first failing field is reported
    pub fn parse(&self) -> Result<Guess> {
        Ok(Guess {
            name: self.name.clone(),
            date_of_birth: parse_date("date of birth", &self.date_of_birth)?,
            length: parse_number("length", &self.length)?,
            weight: parse_number("weight", &self.weight)?,
            gender: self.gender.clone(),
        })
    }
}

// ============================================================================
// PARSED VALUES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Guess {
    pub name: String,
    pub date_of_birth: NaiveDate,
    /// Centimeters
    pub length: f64,
    /// Grams
    pub weight: f64,
    pub gender: String,
}

/// The true newborn stats, entered by the organizer. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ActualOutcome {
    pub date_of_birth: NaiveDate,
    pub length: f64,
    pub weight: f64,
    pub gender: String,
}

// ============================================================================
// FORM PAYLOADS
// ============================================================================

/// `POST /new` body. Missing fields default to empty and fail validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuessForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub gender: String,
}

impl GuessForm {
    /// Validate the submission and produce the record to persist.
    /// The stored text is the trimmed input, so reads give back what was typed.
    pub fn validate(&self) -> Result<GuessRecord> {
        let name = require("name", &self.name)?;
        let dob = self.dob.trim();
        let length = self.length.trim();
        let weight = self.weight.trim();
        parse_date("date of birth", dob)?;
        parse_number("length", length)?;
        parse_number("weight", weight)?;
        let gender = require("gender", &self.gender)?;

        Ok(GuessRecord::new(name, dob, length, weight, gender))
    }
}

/// `POST /result` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActualForm {
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub gender: String,
}

impl ActualForm {
    pub fn parse(&self) -> Result<ActualOutcome> {
        Ok(ActualOutcome {
            date_of_birth: parse_date("date of birth", &self.dob)?,
            length: parse_number("length", &self.length)?,
            weight: parse_number("weight", &self.weight)?,
            gender: require("gender", &self.gender)?.to_string(),
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

pub fn parse_date(field: &'static str, text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| TombolaError::parse(field, format!("'{}' is not a YYYY-MM-DD date", text)))
}

/// Finite decimal number; `inf` and `NaN` are rejected
pub fn parse_number(field: &'static str, text: &str) -> Result<f64> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TombolaError::parse(field, format!("'{}' is not a number", text))),
    }
}

fn require<'a>(field: &'static str, text: &'a str) -> Result<&'a str> {
    let text = text.trim();
    if text.is_empty() {
        Err(TombolaError::parse(field, "must not be empty"))
    } else {
        Ok(text)
    }
}

/// Signed day count `a - b`
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days()
}
