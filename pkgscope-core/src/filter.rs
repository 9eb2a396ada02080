//! Filter expressions: status terms and package references parsed from
//! command-line arguments.
//!
//! ```text
//! +vendor,^unused  github.com/foo/...  ./cmd
//! ```
//!
//! A `+` argument is a comma-separated list of status keywords (each may be
//! abbreviated and prefixed with `^` to negate it) that must all hold.
//! Separate `+` arguments are alternatives. Any other argument is a package
//! reference.

use crate::error::FilterError;
use crate::keyword::{self, Keyword, ScopeList};
use crate::pkgspec::{self, PackageSpec};
use crate::status::{Combinator, StatusGroup, StatusItem};
use serde::{Deserialize, Serialize};
use std::fmt;

const STATUS_PREFIX: char = '+';
const NOT_PREFIX: char = '^';

/// How tree references match nested paths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMatch {
    /// `foo` matches `foo` and `foo/...`, not `foobar`
    #[default]
    Boundary,
    /// Raw string prefix; `foo` also matches `foobar`
    Prefix,
}

impl TreeMatch {
    fn contains(self, root: &str, path: &str) -> bool {
        match self {
            TreeMatch::Prefix => path.starts_with(root),
            TreeMatch::Boundary => {
                root.is_empty()
                    || path
                        .strip_prefix(root)
                        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            }
        }
    }
}

/// Knobs for [`parse_filter_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// List appended to purely negated groups
    pub fallback: ScopeList,
    pub tree_match: TreeMatch,
}

/// A package reference and whether any inventory item matched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterImport {
    pub pkg: PackageSpec,
    pub matched: bool,
}

impl fmt::Display for FilterImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pkg.fmt(f)
    }
}

/// Parsed filter: a status group plus package references in argument order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub status: StatusGroup,
    pub imports: Vec<FilterImport>,
    tree_match: TreeMatch,
}

impl Filter {
    /// Whether the item's status is selected
    pub fn matches(&self, item: &StatusItem) -> bool {
        item.status.matches_group(&self.status)
    }

    /// Index of the first reference matching the item, without recording it
    pub fn match_index(&self, item: &StatusItem) -> Option<usize> {
        self.imports.iter().position(|imp| {
            let pkg = &imp.pkg;
            if pkg.path == item.local || pkg.path == item.canonical {
                return true;
            }
            pkg.match_tree
                && (self.tree_match.contains(&pkg.path, &item.local)
                    || (!item.canonical.is_empty()
                        && self.tree_match.contains(&pkg.path, &item.canonical)))
        })
    }

    /// First reference matching the item; marks it as matched
    pub fn find_import(&mut self, item: &StatusItem) -> Option<&FilterImport> {
        let index = self.match_index(item)?;
        self.mark_matched(index);
        Some(&self.imports[index])
    }

    pub(crate) fn mark_matched(&mut self, index: usize) {
        let imp = &mut self.imports[index];
        if !imp.matched {
            tracing::trace!(reference = %imp.pkg, "reference matched");
            imp.matched = true;
        }
    }

    /// References no item has matched so far
    pub fn unmatched(&self) -> impl Iterator<Item = &FilterImport> {
        self.imports.iter().filter(|imp| !imp.matched)
    }

    pub fn has_imports(&self) -> bool {
        !self.imports.is_empty()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let imports: Vec<String> = self.imports.iter().map(|imp| imp.to_string()).collect();
        write!(f, "status {}, import: {:?}", self.status, imports)
    }
}

/// Parse filter arguments with the default options
pub fn parse_filter<S: AsRef<str>>(base_path: &str, args: &[S]) -> crate::Result<Filter> {
    parse_filter_with(base_path, args, &FilterOptions::default())
}

/// Parse filter arguments.
///
/// Fails on the first unknown status keyword or malformed reference; no
/// partial filter is returned. The status group has the default-scope
/// fallback applied.
pub fn parse_filter_with<S: AsRef<str>>(
    base_path: &str,
    args: &[S],
    options: &FilterOptions,
) -> crate::Result<Filter> {
    let mut status = StatusGroup::new(Combinator::Or);
    let mut imports = Vec::with_capacity(args.len());

    for arg in args {
        let arg = arg.as_ref();
        if arg.is_empty() {
            continue;
        }
        if let Some(expr) = arg.strip_prefix(STATUS_PREFIX) {
            status.group.push(parse_status_group(expr)?);
        } else {
            let pkg = pkgspec::parse(base_path, arg).map_err(|source| {
                FilterError::InvalidPackageReference {
                    reference: arg.to_string(),
                    source,
                }
            })?;
            imports.push(FilterImport {
                pkg,
                matched: false,
            });
        }
    }

    status.widen_pure_negations(options.fallback.statuses());

    let filter = Filter {
        status,
        imports,
        tree_match: options.tree_match,
    };
    tracing::debug!(%filter, "parsed filter");
    Ok(filter)
}

/// One `+` argument: an AND over its comma-separated terms
fn parse_status_group(expr: &str) -> crate::Result<StatusGroup> {
    let mut group = StatusGroup::new(Combinator::And);
    for term in expr.split(',') {
        let (not, name) = match term.strip_prefix(NOT_PREFIX) {
            Some(name) => (true, name),
            None => (false, term),
        };
        match keyword::lookup(name)? {
            Keyword::Single(status) => group.status.push(status.negated(not)),
            Keyword::List(list) => group.group.push(StatusGroup::from_list(list, not)),
        }
    }
    Ok(group)
}
