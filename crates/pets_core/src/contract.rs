//! Stable names shared by storage, routing and callers.
//!
//! # Responsibility
//! - Own table/column identifiers of the `pets` schema.
//! - Own the locator authority/path and content-type prefixes.
//!
//! # Invariants
//! - Column names must match `db/migrations/0001_pets.sql`.
//! - Gender codes are persisted integers and must never be renumbered.

/// Default locator authority for pet records.
pub const CONTENT_AUTHORITY: &str = "com.example.android.pets";
/// Locator scheme prefix (optional when parsing).
pub const CONTENT_SCHEME: &str = "content://";
/// Path segment naming the pet collection.
pub const PATH_PETS: &str = "pets";

pub const TABLE_PETS: &str = "pets";

pub const COLUMN_ID: &str = "_id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_BREED: &str = "breed";
pub const COLUMN_GENDER: &str = "gender";
pub const COLUMN_WEIGHT: &str = "weight";

pub const GENDER_UNKNOWN: i64 = 0;
pub const GENDER_MALE: i64 = 1;
pub const GENDER_FEMALE: i64 = 2;

/// Exclusive lower bound for a stored weight.
pub const WEIGHT_MIN_EXCLUSIVE: i64 = 0;
/// Inclusive upper bound for a stored weight.
pub const WEIGHT_MAX: i64 = 120;

/// Content-type prefix for locators naming many rows.
pub const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";
/// Content-type prefix for locators naming one row.
pub const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";
