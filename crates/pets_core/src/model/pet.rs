//! Pet record model and field validation.
//!
//! # Responsibility
//! - Define `PetRecord`, `Gender` and the typed field/column identifiers.
//! - Validate name/gender/weight before insert and update requests.
//!
//! # Invariants
//! - `name` is never empty on create or on an update that touches it.
//! - `gender` is always one of `Unknown|Male|Female` when present.
//! - `weight`, when present and non-null, lies in `1..=120`.

use crate::contract::{
    COLUMN_BREED, COLUMN_GENDER, COLUMN_ID, COLUMN_NAME, COLUMN_WEIGHT, GENDER_FEMALE,
    GENDER_MALE, GENDER_UNKNOWN, WEIGHT_MAX, WEIGHT_MIN_EXCLUSIVE,
};
use crate::model::values::{FieldValue, PetValues};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned row id.
pub type PetId = i64;

/// Pet gender, persisted as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Unknown,
    Male,
    Female,
}

impl Gender {
    /// Maps a persisted code back to a gender.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            GENDER_UNKNOWN => Some(Self::Unknown),
            GENDER_MALE => Some(Self::Male),
            GENDER_FEMALE => Some(Self::Female),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => GENDER_UNKNOWN,
            Self::Male => GENDER_MALE,
            Self::Female => GENDER_FEMALE,
        }
    }

    /// Returns whether `code` names one of the three known genders.
    pub fn is_valid(code: i64) -> bool {
        Self::from_code(code).is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writable pet fields. `_id` is storage-owned and never writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PetField {
    Name,
    Breed,
    Gender,
    Weight,
}

impl PetField {
    pub const ALL: [PetField; 4] = [Self::Name, Self::Breed, Self::Gender, Self::Weight];

    pub fn column_name(self) -> &'static str {
        match self {
            Self::Name => COLUMN_NAME,
            Self::Breed => COLUMN_BREED,
            Self::Gender => COLUMN_GENDER,
            Self::Weight => COLUMN_WEIGHT,
        }
    }
}

impl Display for PetField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Readable columns, used for projections and sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetColumn {
    Id,
    Name,
    Breed,
    Gender,
    Weight,
}

impl PetColumn {
    /// Full projection in schema order.
    pub const ALL: [PetColumn; 5] = [
        Self::Id,
        Self::Name,
        Self::Breed,
        Self::Gender,
        Self::Weight,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Self::Id => COLUMN_ID,
            Self::Name => COLUMN_NAME,
            Self::Breed => COLUMN_BREED,
            Self::Gender => COLUMN_GENDER,
            Self::Weight => COLUMN_WEIGHT,
        }
    }
}

impl From<PetField> for PetColumn {
    fn from(value: PetField) -> Self {
        match value {
            PetField::Name => Self::Name,
            PetField::Breed => Self::Breed,
            PetField::Gender => Self::Gender,
            PetField::Weight => Self::Weight,
        }
    }
}

/// One row of the `pets` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRecord {
    pub id: PetId,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Gender,
    /// Stored as 0 when the pet was created without a weight.
    pub weight: i64,
}

/// Validation failure naming the offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidField(pub PetField);

impl InvalidField {
    pub fn field(&self) -> PetField {
        self.0
    }
}

impl Display for InvalidField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            PetField::Name => write!(f, "invalid field `name`: pet requires a name"),
            PetField::Gender => write!(f, "invalid field `gender`: pet requires a valid gender"),
            PetField::Weight => write!(
                f,
                "invalid field `weight`: must be greater than {WEIGHT_MIN_EXCLUSIVE} and at most {WEIGHT_MAX}"
            ),
            PetField::Breed => write!(f, "invalid field `breed`"),
        }
    }
}

impl Error for InvalidField {}

/// Validates a name value. `None` means the field was not supplied.
pub fn validate_name(value: Option<&FieldValue>) -> Result<(), InvalidField> {
    match value.and_then(FieldValue::as_text) {
        Some(name) if !name.trim().is_empty() => Ok(()),
        _ => Err(InvalidField(PetField::Name)),
    }
}

/// Validates a gender value. Missing, null and non-numeric values are rejected.
pub fn validate_gender(value: Option<&FieldValue>) -> Result<(), InvalidField> {
    match value.and_then(FieldValue::as_integer) {
        Some(code) if Gender::is_valid(code) => Ok(()),
        _ => Err(InvalidField(PetField::Gender)),
    }
}

/// Validates a weight value. Missing or null weights are accepted.
///
/// A null weight then fails the column's `NOT NULL` constraint in storage.
pub fn validate_weight(value: Option<&FieldValue>) -> Result<(), InvalidField> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }

    match value.as_integer() {
        Some(weight) if weight > WEIGHT_MIN_EXCLUSIVE && weight <= WEIGHT_MAX => Ok(()),
        _ => Err(InvalidField(PetField::Weight)),
    }
}

/// Validates a full field set for insertion.
///
/// Name and gender are mandatory; weight is checked only when supplied.
pub fn validate_for_insert(values: &PetValues) -> Result<(), InvalidField> {
    validate_name(values.get(PetField::Name))?;
    validate_gender(values.get(PetField::Gender))?;
    validate_weight(values.get(PetField::Weight))
}

/// Validates a partial field set for update.
///
/// Only fields present in `values` are checked; absent fields stay unchanged.
pub fn validate_for_update(values: &PetValues) -> Result<(), InvalidField> {
    if values.contains(PetField::Name) {
        validate_name(values.get(PetField::Name))?;
    }
    if values.contains(PetField::Gender) {
        validate_gender(values.get(PetField::Gender))?;
    }
    if values.contains(PetField::Weight) {
        validate_weight(values.get(PetField::Weight))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_validation_accepts_exactly_known_codes() {
        for code in -5..=10 {
            let result = validate_gender(Some(&FieldValue::Integer(code)));
            assert_eq!(result.is_ok(), (0..=2).contains(&code), "code {code}");
        }
        assert!(validate_gender(Some(&FieldValue::Integer(i64::MAX))).is_err());
        assert!(validate_gender(Some(&FieldValue::Integer(i64::MIN))).is_err());
    }

    #[test]
    fn gender_validation_rejects_missing_null_and_text() {
        assert_eq!(validate_gender(None), Err(InvalidField(PetField::Gender)));
        assert!(validate_gender(Some(&FieldValue::Null)).is_err());
        assert!(validate_gender(Some(&FieldValue::from("male"))).is_err());
        assert!(validate_gender(Some(&FieldValue::from("2"))).is_ok());
    }

    #[test]
    fn weight_validation_bounds() {
        for weight in -3..=125 {
            let result = validate_weight(Some(&FieldValue::Integer(weight)));
            assert_eq!(
                result.is_ok(),
                weight > 0 && weight <= 120,
                "weight {weight}"
            );
        }
        assert!(validate_weight(None).is_ok());
        assert!(validate_weight(Some(&FieldValue::Null)).is_ok());
        assert_eq!(
            validate_weight(Some(&FieldValue::from("heavy"))),
            Err(InvalidField(PetField::Weight))
        );
    }

    #[test]
    fn name_validation_rejects_null_and_blank() {
        assert!(validate_name(None).is_err());
        assert!(validate_name(Some(&FieldValue::Null)).is_err());
        assert!(validate_name(Some(&FieldValue::from(""))).is_err());
        assert!(validate_name(Some(&FieldValue::from("   "))).is_err());
        assert!(validate_name(Some(&FieldValue::from("Toto"))).is_ok());
    }

    #[test]
    fn update_validation_only_checks_present_fields() {
        let values = PetValues::new().with(PetField::Breed, "Terrier");
        assert!(validate_for_update(&values).is_ok());
        assert!(validate_for_insert(&values).is_err());

        let values = PetValues::new().with(PetField::Weight, 121);
        assert_eq!(
            validate_for_update(&values),
            Err(InvalidField(PetField::Weight))
        );

        let values = PetValues::new().with(PetField::Name, FieldValue::Null);
        assert_eq!(
            validate_for_update(&values),
            Err(InvalidField(PetField::Name))
        );
    }

    #[test]
    fn insert_validation_reports_name_before_gender() {
        let values = PetValues::new().with(PetField::Gender, 9);
        assert_eq!(
            validate_for_insert(&values),
            Err(InvalidField(PetField::Name))
        );
    }

    #[test]
    fn gender_codes_roundtrip() {
        for gender in [Gender::Unknown, Gender::Male, Gender::Female] {
            assert_eq!(Gender::from_code(gender.code()), Some(gender));
        }
        assert_eq!(Gender::from_code(3), None);
    }
}
