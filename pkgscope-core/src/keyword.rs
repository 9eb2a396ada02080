//! Status keywords accepted after `+` in a filter expression

use crate::error::FilterError;
use crate::status::{Location, Presence, Status, Type};
use serde::{Deserialize, Serialize};

/// Every package outside the workspace, or missing from it
pub const OUTSIDE: &[Status] = &[
    Status::location(Location::External),
    Status::presence(Presence::Missing),
];

/// Every non-standard location
pub const NORMAL: &[Status] = &[
    Status::location(Location::External),
    Status::location(Location::Vendor),
    Status::location(Location::Local),
    Status::location(Location::NotFound),
];

/// Every known location
pub const ALL: &[Status] = &[
    Status::location(Location::Standard),
    Status::location(Location::External),
    Status::location(Location::Vendor),
    Status::location(Location::Local),
    Status::location(Location::NotFound),
];

/// What a keyword stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// One predicate
    Single(Status),
    /// An OR over a fixed list
    List(&'static [Status]),
}

/// Lookup order matters: a term selects the first keyword it is a prefix of.
const TABLE: &[(&str, Keyword)] = &[
    ("external", Keyword::Single(Status::location(Location::External))),
    ("vendor", Keyword::Single(Status::location(Location::Vendor))),
    ("unused", Keyword::Single(Status::presence(Presence::Unused))),
    ("missing", Keyword::Single(Status::presence(Presence::Missing))),
    ("local", Keyword::Single(Status::location(Location::Local))),
    ("program", Keyword::Single(Status::kind(Type::Program))),
    ("std", Keyword::Single(Status::location(Location::Standard))),
    ("standard", Keyword::Single(Status::location(Location::Standard))),
    ("all", Keyword::List(ALL)),
    ("normal", Keyword::List(NORMAL)),
    ("outside", Keyword::List(OUTSIDE)),
];

/// The keyword table in lookup order
pub fn keywords() -> &'static [(&'static str, Keyword)] {
    TABLE
}

/// Resolve a (possibly abbreviated) keyword.
///
/// An empty term is rejected rather than resolving to the first entry.
pub fn lookup(term: &str) -> crate::Result<Keyword> {
    if term.is_empty() {
        return Err(FilterError::UnknownStatus(String::new()));
    }
    TABLE
        .iter()
        .find(|(name, _)| name.starts_with(term))
        .map(|(_, keyword)| *keyword)
        .ok_or_else(|| FilterError::UnknownStatus(term.to_string()))
}

/// Named list used by the default-scope fallback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeList {
    #[default]
    Normal,
    All,
    Outside,
}

impl ScopeList {
    pub fn statuses(self) -> &'static [Status] {
        match self {
            ScopeList::Normal => NORMAL,
            ScopeList::All => ALL,
            ScopeList::Outside => OUTSIDE,
        }
    }
}
