//! Pet domain model and request value types.
//!
//! # Responsibility
//! - Define the canonical `PetRecord` shape read back from storage.
//! - Define partial field sets used by insert/update requests.
//! - Own field validation rules enforced before any mutation.
//!
//! # Invariants
//! - A field missing from a `PetValues` set is different from a field set to null.
//! - Validation never touches storage.

pub mod pet;
pub mod values;
