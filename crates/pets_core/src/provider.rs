//! Locator-routed CRUD provider over the `pets` table.
//!
//! # Responsibility
//! - Compose router, validator and storage engine into query/insert/update/delete/get_type.
//! - Keep SQL details behind the `StorageEngine` boundary.
//!
//! # Invariants
//! - Writes validate before any storage call; a rejected request never touches storage.
//! - An update with an empty field set returns 0 without touching storage.
//! - Storage insert failures surface as `PetError::InsertFailed`, not raw storage errors.
//! - Logs carry ids, counts and field names only, never field values.

use crate::contract::TABLE_PETS;
use crate::db::{DbError, PetCursor, StorageEngine};
use crate::model::pet::{
    validate_for_insert, validate_for_update, Gender, InvalidField, PetColumn, PetField, PetId,
    PetRecord,
};
use crate::model::values::{PetValues, Selection, SortOrder};
use crate::router::{ContentType, Locator, Operation, Router};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PetResult<T> = Result<T, PetError>;

/// Error taxonomy for provider operations.
#[derive(Debug)]
pub enum PetError {
    /// Locator matches neither the collection nor the item shape.
    UnrecognizedLocator(String),
    /// A field failed validation; nothing was written.
    InvalidField(PetField),
    /// Storage rejected the new row (e.g. constraint violation).
    InsertFailed(Locator),
    /// Operation not allowed on this locator shape.
    UnsupportedOperation {
        operation: Operation,
        locator: Locator,
    },
    /// Route table authority is empty or malformed.
    InvalidAuthority(String),
    Db(DbError),
}

impl Display for PetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedLocator(locator) => write!(f, "unrecognized locator: {locator}"),
            Self::InvalidField(field) => write!(f, "{}", InvalidField(*field)),
            Self::InsertFailed(locator) => write!(f, "failed to insert row for {locator}"),
            Self::UnsupportedOperation { operation, locator } => {
                write!(f, "{operation} is not supported for {locator}")
            }
            Self::InvalidAuthority(authority) => write!(f, "invalid authority `{authority}`"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidField> for PetError {
    fn from(value: InvalidField) -> Self {
        Self::InvalidField(value.field())
    }
}

impl From<DbError> for PetError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PetError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Stateless façade over one injected storage engine.
pub struct PetProvider<S: StorageEngine> {
    storage: S,
    router: Router,
}

impl<S: StorageEngine> PetProvider<S> {
    pub fn new(storage: S, router: Router) -> Self {
        Self { storage, router }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Runs a query against a collection or item locator.
    ///
    /// Item locators ignore `selection` and filter by id instead.
    pub fn query(
        &self,
        locator: &Locator,
        projection: &[PetColumn],
        selection: Selection,
        sort_order: &[SortOrder],
    ) -> PetResult<PetCursor> {
        let dispatch = self.router.dispatch(Operation::Query, locator, selection)?;
        let cursor = self
            .storage
            .query(TABLE_PETS, projection, &dispatch.selection, sort_order)?;
        Ok(cursor)
    }

    /// Inserts a new pet and returns the locator of the created row.
    ///
    /// # Errors
    /// - `UnsupportedOperation` for item locators.
    /// - `InvalidField` when name/gender are missing or any field is out of range.
    /// - `InsertFailed` when storage rejects the row.
    pub fn insert(&self, locator: &Locator, values: &PetValues) -> PetResult<Locator> {
        self.router
            .dispatch(Operation::Insert, locator, Selection::all())?;

        if let Err(err) = validate_for_insert(values) {
            warn!(
                "event=pet_insert module=provider status=rejected field={}",
                err.field()
            );
            return Err(err.into());
        }

        match self.storage.insert(TABLE_PETS, values)? {
            Some(id) => {
                info!(
                    "event=pet_insert module=provider status=ok id={id} fields={}",
                    values.field_names()
                );
                Ok(locator.with_appended_id(id))
            }
            None => {
                error!("event=pet_insert module=provider status=error locator={locator}");
                Err(PetError::InsertFailed(locator.clone()))
            }
        }
    }

    /// Updates rows named by `locator` with a partial field set.
    ///
    /// Returns the number of affected rows; 0 for an empty field set.
    pub fn update(
        &self,
        locator: &Locator,
        values: &PetValues,
        selection: Selection,
    ) -> PetResult<usize> {
        let dispatch = self.router.dispatch(Operation::Update, locator, selection)?;

        if let Err(err) = validate_for_update(values) {
            warn!(
                "event=pet_update module=provider status=rejected field={}",
                err.field()
            );
            return Err(err.into());
        }
        if values.is_empty() {
            info!("event=pet_update module=provider status=noop rows=0");
            return Ok(0);
        }

        let changed = self
            .storage
            .update(TABLE_PETS, values, &dispatch.selection)?;
        info!(
            "event=pet_update module=provider status=ok rows={changed} fields={}",
            values.field_names()
        );
        Ok(changed)
    }

    /// Deletes rows named by `locator`; the collection with no selection deletes all.
    pub fn delete(&self, locator: &Locator, selection: Selection) -> PetResult<usize> {
        let dispatch = self.router.dispatch(Operation::Delete, locator, selection)?;
        let deleted = self.storage.delete(TABLE_PETS, &dispatch.selection)?;
        info!("event=pet_delete module=provider status=ok rows={deleted}");
        Ok(deleted)
    }

    /// Resolves the content type a locator names.
    pub fn get_type(&self, locator: &Locator) -> PetResult<ContentType> {
        self.router.content_type(locator)
    }

    /// Lists every pet ordered by id.
    pub fn list_pets(&self) -> PetResult<Vec<PetRecord>> {
        let cursor = self.query(
            &self.router.collection_locator(),
            &PetColumn::ALL,
            Selection::all(),
            &[SortOrder::asc(PetColumn::Id)],
        )?;
        Ok(cursor.to_records()?)
    }

    pub fn get_pet(&self, id: PetId) -> PetResult<Option<PetRecord>> {
        let cursor = self.query(
            &self.router.item_locator(id),
            &PetColumn::ALL,
            Selection::all(),
            &[],
        )?;
        Ok(cursor.row(0).map(|row| row.to_record()).transpose()?)
    }

    pub fn count_pets(&self) -> PetResult<usize> {
        let cursor = self.query(
            &self.router.collection_locator(),
            &[PetColumn::Id],
            Selection::all(),
            &[],
        )?;
        Ok(cursor.len())
    }

    /// Inserts the canned sample pet (Toto, Terrier, male, 7).
    pub fn insert_dummy_pet(&self) -> PetResult<Locator> {
        let values = PetValues::new_pet("Toto", Some("Terrier".to_string()), Gender::Male, Some(7));
        self.insert(&self.router.collection_locator(), &values)
    }

    pub fn delete_all_pets(&self) -> PetResult<usize> {
        self.delete(&self.router.collection_locator(), Selection::all())
    }
}
