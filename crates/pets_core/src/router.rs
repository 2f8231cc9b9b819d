//! Locator parsing and request routing.
//!
//! # Responsibility
//! - Parse `content://<authority>/pets[/<id>]` locators.
//! - Match locators against an immutable route table built once per provider.
//! - Rewrite item requests into `_id = ?` selections.
//!
//! # Invariants
//! - A locator matching no route fails with `UnrecognizedLocator` for every operation.
//! - Insert is only accepted on the collection route.
//! - The first matching route table entry wins.

use crate::contract::{
    CONTENT_SCHEME, CURSOR_DIR_BASE_TYPE, CURSOR_ITEM_BASE_TYPE, PATH_PETS,
};
use crate::model::pet::PetId;
use crate::model::values::Selection;
use crate::provider::{PetError, PetResult};
use log::debug;
use regex::Regex;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Path-like identifier naming the pet collection or one pet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// `content://<authority>/pets`
    pub fn collection(authority: &str) -> Self {
        Self(format!("{CONTENT_SCHEME}{authority}/{PATH_PETS}"))
    }

    /// Appends a numeric id segment, e.g. `.../pets` -> `.../pets/3`.
    pub fn with_appended_id(&self, id: PetId) -> Self {
        Self(format!("{}/{id}", self.0.trim_end_matches('/')))
    }

    /// Returns the trailing numeric segment, if any.
    pub fn parse_id(&self) -> Option<PetId> {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Locator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Route codes registered in a `RouteTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCode {
    Pets,
    PetId,
}

/// Resolved route for one locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Pets,
    PetId(PetId),
}

/// Kind of request being routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Query,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content type of the data a locator names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Collection,
    Item,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Item => "item",
        }
    }

    /// MIME-style tag, e.g. `vnd.android.cursor.dir/<authority>.pets`.
    pub fn mime_type(self, authority: &str) -> String {
        let base = match self {
            Self::Collection => CURSOR_DIR_BASE_TYPE,
            Self::Item => CURSOR_ITEM_BASE_TYPE,
        };
        format!("{base}/{authority}.{PATH_PETS}")
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct RouteEntry {
    pattern: String,
    regex: Regex,
    code: RouteCode,
}

/// Immutable ordered list of `(pattern, code)` pairs for one authority.
///
/// Pattern segments: `#` matches one numeric segment, anything else matches
/// literally.
#[derive(Debug, Clone)]
pub struct RouteTable {
    authority: String,
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Compiles the given patterns for `authority`.
    ///
    /// # Errors
    /// - `PetError::InvalidAuthority` when the authority is empty or contains `/`.
    pub fn new(authority: &str, patterns: &[(&str, RouteCode)]) -> PetResult<Self> {
        let authority = authority.trim();
        if authority.is_empty() || authority.contains('/') {
            return Err(PetError::InvalidAuthority(authority.to_string()));
        }

        let entries = patterns
            .iter()
            .map(|(pattern, code)| -> PetResult<RouteEntry> {
                let regex = compile_pattern(authority, pattern)
                    .map_err(|_| PetError::InvalidAuthority(authority.to_string()))?;
                Ok(RouteEntry {
                    pattern: (*pattern).to_string(),
                    regex,
                    code: *code,
                })
            })
            .collect::<PetResult<Vec<_>>>()?;

        Ok(Self {
            authority: authority.to_string(),
            entries,
        })
    }

    /// Standard table: `pets` -> `Pets`, `pets/#` -> `PetId`.
    pub fn pets(authority: &str) -> PetResult<Self> {
        let item_pattern = format!("{PATH_PETS}/#");
        Self::new(
            authority,
            &[
                (PATH_PETS, RouteCode::Pets),
                (item_pattern.as_str(), RouteCode::PetId),
            ],
        )
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns the first matching code and the captured numeric id, if any.
    fn lookup<'l>(&self, locator: &'l str) -> Option<(RouteCode, Option<&'l str>)> {
        self.entries.iter().find_map(|entry| {
            entry.regex.captures(locator).map(|captures| {
                let captured = captures.get(1).map(|m| m.as_str());
                debug!(
                    "event=route_match module=router status=ok pattern={} code={:?}",
                    entry.pattern, entry.code
                );
                (entry.code, captured)
            })
        })
    }
}

fn compile_pattern(authority: &str, pattern: &str) -> Result<Regex, regex::Error> {
    let path = pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment {
            "#" => r"(\d+)".to_string(),
            literal => regex::escape(literal),
        })
        .collect::<Vec<_>>()
        .join("/");
    Regex::new(&format!(
        "^(?:{})?{}/{path}/?$",
        regex::escape(CONTENT_SCHEME),
        regex::escape(authority)
    ))
}

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub route: Route,
    /// Effective selection after item rewriting.
    pub selection: Selection,
}

/// Maps locators and operations onto routes.
#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Router over the standard pets table for `authority`.
    pub fn for_authority(authority: &str) -> PetResult<Self> {
        Ok(Self::new(RouteTable::pets(authority)?))
    }

    pub fn authority(&self) -> &str {
        self.table.authority()
    }

    /// Locator naming the whole collection for this router's authority.
    pub fn collection_locator(&self) -> Locator {
        Locator::collection(self.table.authority())
    }

    pub fn item_locator(&self, id: PetId) -> Locator {
        self.collection_locator().with_appended_id(id)
    }

    /// Resolves a locator to a route.
    ///
    /// # Errors
    /// - `PetError::UnrecognizedLocator` when no route matches or the id overflows.
    pub fn route(&self, locator: &Locator) -> PetResult<Route> {
        let unrecognized = || PetError::UnrecognizedLocator(locator.to_string());
        match self.table.lookup(locator.as_str()) {
            Some((RouteCode::Pets, _)) => Ok(Route::Pets),
            Some((RouteCode::PetId, Some(id))) => {
                id.parse().map(Route::PetId).map_err(|_| unrecognized())
            }
            Some((RouteCode::PetId, None)) | None => Err(unrecognized()),
        }
    }

    pub fn content_type(&self, locator: &Locator) -> PetResult<ContentType> {
        Ok(match self.route(locator)? {
            Route::Pets => ContentType::Collection,
            Route::PetId(_) => ContentType::Item,
        })
    }

    /// Routes one request and computes the selection storage should use.
    ///
    /// Item locators replace the caller selection with `_id = ?`.
    ///
    /// # Errors
    /// - `PetError::UnrecognizedLocator` for unknown locators.
    /// - `PetError::UnsupportedOperation` for insert on an item locator.
    pub fn dispatch(
        &self,
        operation: Operation,
        locator: &Locator,
        selection: Selection,
    ) -> PetResult<Dispatch> {
        let route = self.route(locator)?;
        match (operation, route) {
            (Operation::Insert, Route::PetId(_)) => Err(PetError::UnsupportedOperation {
                operation,
                locator: locator.clone(),
            }),
            (_, Route::Pets) => Ok(Dispatch { route, selection }),
            (_, Route::PetId(id)) => {
                if !selection.is_all() {
                    debug!(
                        "event=route_dispatch module=router status=ok op={operation} detail=caller_selection_replaced"
                    );
                }
                Ok(Dispatch {
                    route,
                    selection: Selection::by_id(id),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::CONTENT_AUTHORITY;
    use crate::model::values::FieldValue;

    fn router() -> Router {
        Router::for_authority(CONTENT_AUTHORITY).unwrap()
    }

    #[test]
    fn routes_collection_and_item_locators() {
        let router = router();
        let collection = Locator::new("content://com.example.android.pets/pets");
        assert_eq!(router.route(&collection).unwrap(), Route::Pets);
        assert_eq!(
            router.route(&collection.with_appended_id(42)).unwrap(),
            Route::PetId(42)
        );
        assert_eq!(
            router
                .route(&Locator::new("com.example.android.pets/pets/7"))
                .unwrap(),
            Route::PetId(7)
        );
        assert_eq!(
            router
                .route(&Locator::new("content://com.example.android.pets/pets/"))
                .unwrap(),
            Route::Pets
        );
    }

    #[test]
    fn rejects_unknown_shapes() {
        let router = router();
        for raw in [
            "content://com.example.android.pets/cats",
            "content://other.authority/pets",
            "content://com.example.android.pets/pets/abc",
            "content://com.example.android.pets/pets/1/2",
            "content://com.example.android.pets/pets/-1",
            "content://com.example.android.pets/pets/99999999999999999999",
            "http://com.example.android.pets/pets",
            "content://com.example.android.petsX/pets",
            "",
        ] {
            let err = router.route(&Locator::new(raw)).unwrap_err();
            assert!(
                matches!(err, PetError::UnrecognizedLocator(ref value) if value == raw),
                "{raw}"
            );
        }
    }

    #[test]
    fn authority_dots_match_literally() {
        let router = router();
        let err = router
            .route(&Locator::new("content://comXexample.android.pets/pets"))
            .unwrap_err();
        assert!(matches!(err, PetError::UnrecognizedLocator(_)));
    }

    #[test]
    fn item_dispatch_rewrites_selection() {
        let router = router();
        let caller = Selection::new("name = ?", vec![FieldValue::from("Toto")]);

        let dispatch = router
            .dispatch(Operation::Update, &router.item_locator(5), caller.clone())
            .unwrap();
        assert_eq!(dispatch.route, Route::PetId(5));
        assert_eq!(dispatch.selection, Selection::by_id(5));

        let dispatch = router
            .dispatch(Operation::Delete, &router.collection_locator(), caller.clone())
            .unwrap();
        assert_eq!(dispatch.selection, caller);
    }

    #[test]
    fn insert_on_item_is_unsupported() {
        let router = router();
        let err = router
            .dispatch(Operation::Insert, &router.item_locator(1), Selection::all())
            .unwrap_err();
        assert!(matches!(
            err,
            PetError::UnsupportedOperation {
                operation: Operation::Insert,
                ..
            }
        ));
    }

    #[test]
    fn content_types_are_distinct_and_stable() {
        let router = router();
        let collection = router.collection_locator();
        let item = router.item_locator(3);
        for _ in 0..3 {
            assert_eq!(router.content_type(&collection).unwrap(), ContentType::Collection);
            assert_eq!(router.content_type(&item).unwrap(), ContentType::Item);
        }
        assert_eq!(
            ContentType::Collection.mime_type(CONTENT_AUTHORITY),
            "vnd.android.cursor.dir/com.example.android.pets.pets"
        );
        assert_eq!(
            ContentType::Item.mime_type(CONTENT_AUTHORITY),
            "vnd.android.cursor.item/com.example.android.pets.pets"
        );
    }

    #[test]
    fn rejects_invalid_authority() {
        assert!(matches!(
            Router::for_authority(""),
            Err(PetError::InvalidAuthority(_))
        ));
        assert!(matches!(
            Router::for_authority("a/b"),
            Err(PetError::InvalidAuthority(_))
        ));
    }

    #[test]
    fn locator_helpers() {
        let collection = Locator::collection("auth");
        assert_eq!(collection.as_str(), "content://auth/pets");
        assert_eq!(collection.parse_id(), None);
        assert_eq!(collection.with_appended_id(9).parse_id(), Some(9));
    }
}
