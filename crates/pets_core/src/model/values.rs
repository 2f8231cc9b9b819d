//! Request value types: field sets, selections and sort orders.
//!
//! # Responsibility
//! - Carry partial pet field sets from callers to storage.
//! - Carry caller filter expressions and their bound arguments.
//!
//! # Invariants
//! - `PetValues` keys are typed `PetField`s, so no caller text is used as a column name.
//! - Selection clauses use anonymous `?` placeholders only.

use crate::contract::COLUMN_ID;
use crate::model::pet::{Gender, PetColumn, PetField, PetId};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// One loosely typed cell value, coerced on read like content values are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Reads the value as text. Integers are rendered in decimal.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Integer(value) => Some(Cow::Owned(value.to_string())),
            Self::Text(value) => Some(Cow::Borrowed(value.as_str())),
        }
    }

    /// Reads the value as an integer. Non-numeric text yields `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Null => None,
            Self::Integer(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Gender> for FieldValue {
    fn from(value: Gender) -> Self {
        Self::Integer(value.code())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(Value::Null),
            Self::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Self::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}

impl FromSql for FieldValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Self::Null),
            ValueRef::Integer(value) => Ok(Self::Integer(value)),
            ValueRef::Text(_) => Ok(Self::Text(value.as_str()?.to_string())),
            ValueRef::Real(_) | ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// Partial field set for insert/update requests.
///
/// A field missing from the set means "leave unchanged"; a field present with
/// `FieldValue::Null` means "set to null".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetValues {
    entries: BTreeMap<PetField, FieldValue>,
}

impl PetValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a complete field set for a new pet.
    pub fn new_pet(
        name: impl Into<String>,
        breed: Option<String>,
        gender: Gender,
        weight: Option<i64>,
    ) -> Self {
        let name: String = name.into();
        let mut values = Self::new()
            .with(PetField::Name, name)
            .with(PetField::Gender, gender);
        if let Some(breed) = breed {
            values.put(PetField::Breed, breed);
        }
        if let Some(weight) = weight {
            values.put(PetField::Weight, weight);
        }
        values
    }

    pub fn with(mut self, field: PetField, value: impl Into<FieldValue>) -> Self {
        self.put(field, value);
        self
    }

    pub fn put(&mut self, field: PetField, value: impl Into<FieldValue>) -> &mut Self {
        self.entries.insert(field, value.into());
        self
    }

    pub fn put_null(&mut self, field: PetField) -> &mut Self {
        self.entries.insert(field, FieldValue::Null);
        self
    }

    pub fn remove(&mut self, field: PetField) -> Option<FieldValue> {
        self.entries.remove(&field)
    }

    pub fn get(&self, field: PetField) -> Option<&FieldValue> {
        self.entries.get(&field)
    }

    pub fn contains(&self, field: PetField) -> bool {
        self.entries.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates fields in stable `PetField` order.
    pub fn iter(&self) -> btree_map::Iter<'_, PetField, FieldValue> {
        self.entries.iter()
    }

    /// Field names only, for metadata-only logging.
    pub fn field_names(&self) -> String {
        self.entries
            .keys()
            .map(|field| field.column_name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<'a> IntoIterator for &'a PetValues {
    type Item = (&'a PetField, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, PetField, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Caller filter: a SQL `WHERE` clause plus its bound arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    clause: Option<String>,
    args: Vec<FieldValue>,
}

impl Selection {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(clause: impl Into<String>, args: Vec<FieldValue>) -> Self {
        Self {
            clause: Some(clause.into()),
            args,
        }
    }

    /// Matches exactly the row with the given id.
    pub fn by_id(id: PetId) -> Self {
        Self::new(format!("{COLUMN_ID} = ?"), vec![FieldValue::Integer(id)])
    }

    pub fn clause(&self) -> Option<&str> {
        self.clause.as_deref()
    }

    pub fn args(&self) -> &[FieldValue] {
        &self.args
    }

    /// True when the clause is absent or blank. Arguments are not considered.
    pub fn is_all(&self) -> bool {
        self.clause().map_or(true, |clause| clause.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: PetColumn,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(column: PetColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: PetColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }

    pub(crate) fn to_sql(self) -> String {
        let direction = match self.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        format!("{} {direction}", self.column.column_name())
    }
}
