//! Status algebra: predicates over package classification and the groups
//! that combine them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a package was found relative to the workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Unset; matches any location
    #[default]
    Unknown,
    Standard,
    External,
    Vendor,
    Local,
    #[serde(rename = "notfound")]
    NotFound,
}

/// Whether a package is referenced by the workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Unset; matches any presence
    #[default]
    Unknown,
    Unused,
    Missing,
}

/// Kind of package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// Unset; matches any type
    #[default]
    Unknown,
    Program,
}

impl Location {
    fn as_str(self) -> &'static str {
        match self {
            Location::Unknown => "*",
            Location::Standard => "std",
            Location::External => "external",
            Location::Vendor => "vendor",
            Location::Local => "local",
            Location::NotFound => "notfound",
        }
    }
}

impl Presence {
    fn as_str(self) -> &'static str {
        match self {
            Presence::Unknown => "*",
            Presence::Unused => "unused",
            Presence::Missing => "missing",
        }
    }
}

impl Type {
    fn as_str(self) -> &'static str {
        match self {
            Type::Unknown => "*",
            Type::Program => "program",
        }
    }
}

/// A single status test.
///
/// As a predicate, unset fields are wildcards and `not` inverts the whole
/// result. As the status of an inventory item, `not` is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub presence: Presence,
    #[serde(default, rename = "type")]
    pub kind: Type,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not: bool,
}

impl Status {
    pub const fn location(location: Location) -> Self {
        Self {
            location,
            presence: Presence::Unknown,
            kind: Type::Unknown,
            not: false,
        }
    }

    pub const fn presence(presence: Presence) -> Self {
        Self {
            location: Location::Unknown,
            presence,
            kind: Type::Unknown,
            not: false,
        }
    }

    pub const fn kind(kind: Type) -> Self {
        Self {
            location: Location::Unknown,
            presence: Presence::Unknown,
            kind,
            not: false,
        }
    }

    /// Return this predicate with its negation flag set to `not`
    pub const fn negated(mut self, not: bool) -> Self {
        self.not = not;
        self
    }

    /// Test this predicate against the status of an inventory item
    pub fn matches(&self, item: &Status) -> bool {
        let hit = (self.location == Location::Unknown || self.location == item.location)
            && (self.presence == Presence::Unknown || self.presence == item.presence)
            && (self.kind == Type::Unknown || self.kind == item.kind);
        hit != self.not
    }

    /// Test the status of an inventory item against a whole group
    pub fn matches_group(&self, group: &StatusGroup) -> bool {
        group.matches(self)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not {
            f.write_str("^")?;
        }
        let parts: Vec<&str> = [
            (self.location != Location::Unknown).then(|| self.location.as_str()),
            (self.presence != Presence::Unknown).then(|| self.presence.as_str()),
            (self.kind != Type::Unknown).then(|| self.kind.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if parts.is_empty() {
            f.write_str("*")
        } else {
            f.write_str(&parts.join("+"))
        }
    }
}

/// How the members of a group are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

/// A combinator over predicates and nested groups, with its own negation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusGroup {
    pub status: Vec<Status>,
    pub group: Vec<StatusGroup>,
    pub combinator: Combinator,
    pub not: bool,
}

impl StatusGroup {
    pub fn new(combinator: Combinator) -> Self {
        Self {
            status: Vec::new(),
            group: Vec::new(),
            combinator,
            not: false,
        }
    }

    /// OR group over a fixed predicate list
    pub fn from_list(list: &[Status], not: bool) -> Self {
        Self {
            status: list.to_vec(),
            group: Vec::new(),
            combinator: Combinator::Or,
            not,
        }
    }

    /// Evaluate the group against the status of an inventory item.
    ///
    /// An empty AND group matches everything, an empty OR group nothing.
    pub fn matches(&self, item: &Status) -> bool {
        let mut results = self
            .status
            .iter()
            .map(|s| s.matches(item))
            .chain(self.group.iter().map(|g| g.matches(item)));
        let raw = match self.combinator {
            Combinator::And => results.all(|m| m),
            Combinator::Or => results.any(|m| m),
        };
        raw != self.not
    }

    /// Default-scope fallback.
    ///
    /// A group without children whose predicates are all negated only
    /// excludes things; give it an OR of `list` so it stays within that
    /// universe. Applied recursively to every child.
    pub fn widen_pure_negations(&mut self, list: &[Status]) {
        if self.group.is_empty() && self.status.iter().all(|s| s.not) {
            tracing::debug!(group = %self, "widening pure negation");
            self.group.push(StatusGroup::from_list(list, false));
        }
        for child in &mut self.group {
            child.widen_pure_negations(list);
        }
    }
}

impl fmt::Display for StatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not {
            f.write_str("^")?;
        }
        let sep = match self.combinator {
            Combinator::And => " & ",
            Combinator::Or => " | ",
        };
        let members: Vec<String> = self
            .status
            .iter()
            .map(|s| s.to_string())
            .chain(self.group.iter().map(|g| g.to_string()))
            .collect();
        write!(f, "({})", members.join(sep))
    }
}

/// A classified inventory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusItem {
    #[serde(default)]
    pub status: Status,
    /// Workspace-relative path
    pub local: String,
    /// Resolved import path
    #[serde(default)]
    pub canonical: String,
}

impl StatusItem {
    pub fn new(status: Status, local: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            status,
            local: local.into(),
            canonical: canonical.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATIONS: [Location; 6] = [
        Location::Unknown,
        Location::Standard,
        Location::External,
        Location::Vendor,
        Location::Local,
        Location::NotFound,
    ];

    fn at(location: Location) -> Status {
        Status::location(location)
    }

    #[test]
    fn test_wildcard_matches_everything() {
        let wildcard = Status::default();
        for location in LOCATIONS {
            let item = Status {
                location,
                presence: Presence::Missing,
                kind: Type::Program,
                not: false,
            };
            assert!(wildcard.matches(&item));
        }
    }

    #[test]
    fn test_negation_inverts_predicate() {
        let predicates = [
            at(Location::Vendor),
            Status::presence(Presence::Unused),
            Status::kind(Type::Program),
            Status::default(),
        ];
        for p in predicates {
            for location in LOCATIONS {
                let item = Status {
                    location,
                    presence: Presence::Unused,
                    ..Default::default()
                };
                assert_eq!(p.negated(true).matches(&item), !p.matches(&item));
            }
        }
    }

    #[test]
    fn test_predicate_requires_every_set_field() {
        let p = Status {
            location: Location::External,
            presence: Presence::Missing,
            ..Default::default()
        };
        assert!(!p.matches(&at(Location::External)));
        assert!(p.matches(&Status {
            location: Location::External,
            presence: Presence::Missing,
            kind: Type::Program,
            not: false,
        }));
    }

    #[test]
    fn test_item_negation_is_ignored() {
        let item = at(Location::Vendor).negated(true);
        assert!(at(Location::Vendor).matches(&item));
    }

    #[test]
    fn test_empty_and_group_is_vacuously_true() {
        let group = StatusGroup::new(Combinator::And);
        for location in LOCATIONS {
            assert!(group.matches(&at(location)));
        }
    }

    #[test]
    fn test_empty_or_group_matches_nothing() {
        let group = StatusGroup::new(Combinator::Or);
        assert!(!group.matches(&at(Location::Local)));
    }

    #[test]
    fn test_group_negation_and_nesting() {
        let mut group = StatusGroup::new(Combinator::And);
        group.status.push(Status::presence(Presence::Unused).negated(true));
        group.group.push(StatusGroup::from_list(
            &[at(Location::Vendor), at(Location::Local)],
            false,
        ));

        assert!(group.matches(&at(Location::Vendor)));
        assert!(!group.matches(&at(Location::External)));
        assert!(!group.matches(&Status {
            location: Location::Local,
            presence: Presence::Unused,
            ..Default::default()
        }));

        group.not = true;
        assert!(!group.matches(&at(Location::Vendor)));
        assert!(group.matches(&at(Location::External)));
    }

    #[test]
    fn test_item_matches_group() {
        let mut group = StatusGroup::new(Combinator::And);
        group.status.push(at(Location::Local).negated(true));
        group.widen_pure_negations(&[at(Location::Vendor), at(Location::Local)]);
        assert!(at(Location::Vendor).matches_group(&group));
        assert!(!at(Location::Local).matches_group(&group));
        assert!(!at(Location::Standard).matches_group(&group));
    }

    #[test]
    fn test_deep_nesting() {
        let mut group = StatusGroup::from_list(&[at(Location::Local)], false);
        for _ in 0..200 {
            let mut parent = StatusGroup::new(Combinator::And);
            parent.group.push(group);
            group = parent;
        }
        assert!(group.matches(&at(Location::Local)));
        assert!(!group.matches(&at(Location::Vendor)));
    }

    #[test]
    fn test_widen_only_pure_negations() {
        let normal = [at(Location::External), at(Location::Vendor)];

        let mut pure = StatusGroup::new(Combinator::And);
        pure.status.push(at(Location::Vendor).negated(true));
        pure.widen_pure_negations(&normal);
        assert_eq!(pure.group, vec![StatusGroup::from_list(&normal, false)]);

        let mut mixed = StatusGroup::new(Combinator::And);
        mixed.status.push(at(Location::Vendor).negated(true));
        mixed.status.push(Status::presence(Presence::Unused));
        mixed.widen_pure_negations(&normal);
        assert!(mixed.group.is_empty());
    }

    #[test]
    fn test_widen_is_stable_on_second_pass() {
        let normal = [at(Location::External)];
        let mut group = StatusGroup::new(Combinator::Or);
        group.widen_pure_negations(&normal);
        let once = group.clone();
        group.widen_pure_negations(&normal);
        assert_eq!(group, once);
    }

    #[test]
    fn test_display() {
        let mut group = StatusGroup::new(Combinator::And);
        group.status.push(at(Location::Vendor).negated(true));
        group.status.push(Status {
            location: Location::External,
            presence: Presence::Missing,
            ..Default::default()
        });
        group.group.push(StatusGroup::from_list(
            &[at(Location::Local), Status::default()],
            true,
        ));
        assert_eq!(
            group.to_string(),
            "(^vendor & external+missing & ^(local | *))"
        );
    }

    #[test]
    fn test_item_from_json() {
        let item: StatusItem = serde_json::from_str(
            r#"{"status": {"location": "notfound", "type": "program"}, "local": "cmd/x"}"#,
        )
        .unwrap();
        assert_eq!(item.status.location, Location::NotFound);
        assert_eq!(item.status.kind, Type::Program);
        assert_eq!(item.status.presence, Presence::Unknown);
        assert_eq!(item.canonical, "");
    }
}
