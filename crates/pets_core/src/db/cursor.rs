//! Query results returned by the storage engine.
//!
//! A `PetCursor` owns every row fetched by one query. The SQLite statement is
//! finalized before the cursor is handed out, so dropping the cursor (on any
//! exit path) releases everything the query held.

use super::{DbError, DbResult};
use crate::model::pet::{Gender, PetColumn, PetRecord};
use crate::model::values::FieldValue;
use std::borrow::Cow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetCursor {
    columns: Vec<PetColumn>,
    rows: Vec<Vec<FieldValue>>,
}

impl PetCursor {
    pub(crate) fn new(columns: Vec<PetColumn>, rows: Vec<Vec<FieldValue>>) -> Self {
        Self { columns, rows }
    }

    /// Projected columns, in projection order.
    pub fn columns(&self) -> &[PetColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<CursorRow<'_>> {
        self.rows.get(index).map(|values| CursorRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = CursorRow<'_>> + '_ {
        self.rows.iter().map(|values| CursorRow {
            columns: &self.columns,
            values,
        })
    }

    /// Maps every row to a `PetRecord`.
    ///
    /// # Errors
    /// - `DbError::InvalidData` when a required column was not projected or a
    ///   stored value does not fit the model.
    pub fn to_records(&self) -> DbResult<Vec<PetRecord>> {
        self.rows().map(|row| row.to_record()).collect()
    }
}

/// Borrowed view of one cursor row.
#[derive(Debug, Clone, Copy)]
pub struct CursorRow<'c> {
    columns: &'c [PetColumn],
    values: &'c [FieldValue],
}

impl<'c> CursorRow<'c> {
    pub fn get(&self, column: PetColumn) -> Option<&'c FieldValue> {
        self.columns
            .iter()
            .position(|candidate| *candidate == column)
            .and_then(|index| self.values.get(index))
    }

    pub fn get_i64(&self, column: PetColumn) -> Option<i64> {
        self.get(column).and_then(FieldValue::as_integer)
    }

    pub fn get_text(&self, column: PetColumn) -> Option<Cow<'c, str>> {
        self.get(column).and_then(FieldValue::as_text)
    }

    pub fn to_record(&self) -> DbResult<PetRecord> {
        let id = self.required_i64(PetColumn::Id)?;
        let name = self
            .get_text(PetColumn::Name)
            .ok_or_else(|| missing(PetColumn::Name))?
            .into_owned();
        let gender_code = self.required_i64(PetColumn::Gender)?;
        let gender = Gender::from_code(gender_code).ok_or_else(|| {
            DbError::InvalidData(format!("invalid gender `{gender_code}` in pets.gender"))
        })?;
        if !self.columns.contains(&PetColumn::Breed) {
            return Err(missing(PetColumn::Breed));
        }

        Ok(PetRecord {
            id,
            name,
            breed: self.get_text(PetColumn::Breed).map(Cow::into_owned),
            gender,
            weight: self.required_i64(PetColumn::Weight)?,
        })
    }

    fn required_i64(&self, column: PetColumn) -> DbResult<i64> {
        self.get_i64(column).ok_or_else(|| missing(column))
    }
}

fn missing(column: PetColumn) -> DbError {
    DbError::InvalidData(format!(
        "column `{}` is missing or null in cursor row",
        column.column_name()
    ))
}
