//! Running a filter over a classified inventory

use crate::filter::Filter;
use crate::pkgspec::PackageSpec;
use crate::status::StatusItem;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

/// An inventory item chosen by a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selected {
    pub item: StatusItem,
    /// Reference the item matched, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<PackageSpec>,
}

/// Outcome of scanning an inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub items: Vec<Selected>,
    /// References that no inventory item matched
    pub unmatched: Vec<PackageSpec>,
}

/// Read a JSON array of classified items
pub fn read_inventory(path: &Path) -> crate::Result<Vec<StatusItem>> {
    let content = std::fs::read_to_string(path)?;
    let items: Vec<StatusItem> = serde_json::from_str(&content)?;
    tracing::debug!(path = %path.display(), items = items.len(), "read inventory");
    Ok(items)
}

/// Scan `items` in order.
///
/// Every item is offered to the reference matcher, so references are
/// recorded even for items whose status is not selected. An item is
/// selected when its status matches and, if the filter names references,
/// it matched one of them.
pub fn select(filter: &mut Filter, items: &[StatusItem]) -> Selection {
    let mut selection = Selection::default();
    for item in items {
        let reference = filter.find_import(item).map(|imp| imp.pkg.clone());
        if let Some(selected) = choose(filter, item, reference) {
            selection.items.push(selected);
        }
    }
    finish(filter, selection)
}

/// Same result as [`select`], evaluating items on the rayon pool.
///
/// Workers only read the filter; matched flags are merged afterwards on the
/// calling thread.
pub fn select_parallel(filter: &mut Filter, items: &[StatusItem]) -> Selection {
    let shared: &Filter = filter;
    let hits: Vec<(bool, Option<usize>)> = items
        .par_iter()
        .map(|item| (shared.matches(item), shared.match_index(item)))
        .collect();

    let mut selection = Selection::default();
    for (item, (status_ok, index)) in items.iter().zip(hits) {
        if let Some(index) = index {
            filter.mark_matched(index);
        }
        let reference = index.map(|i| filter.imports[i].pkg.clone());
        let selected = status_ok && (reference.is_some() || !filter.has_imports());
        if selected {
            selection.items.push(Selected {
                item: item.clone(),
                reference,
            });
        }
    }
    finish(filter, selection)
}

fn choose(filter: &Filter, item: &StatusItem, reference: Option<PackageSpec>) -> Option<Selected> {
    if !filter.matches(item) {
        return None;
    }
    if filter.has_imports() && reference.is_none() {
        return None;
    }
    Some(Selected {
        item: item.clone(),
        reference,
    })
}

fn finish(filter: &Filter, mut selection: Selection) -> Selection {
    selection.unmatched = filter.unmatched().map(|imp| imp.pkg.clone()).collect();
    tracing::debug!(
        selected = selection.items.len(),
        unmatched = selection.unmatched.len(),
        "scan complete"
    );
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_filter;
    use crate::status::{Location, Presence, Status};

    fn inventory() -> Vec<StatusItem> {
        vec![
            StatusItem::new(Status::location(Location::Standard), "fmt", "fmt"),
            StatusItem::new(
                Status::location(Location::Vendor),
                "proj/vendor/github.com/a/x",
                "github.com/a/x",
            ),
            StatusItem::new(
                Status::location(Location::External),
                "github.com/a/y",
                "github.com/a/y",
            ),
            StatusItem::new(
                Status {
                    location: Location::Local,
                    presence: Presence::Unused,
                    ..Default::default()
                },
                "proj/internal/old",
                "proj/internal/old",
            ),
        ]
    }

    fn locals(selection: &Selection) -> Vec<&str> {
        selection.items.iter().map(|s| s.item.local.as_str()).collect()
    }

    #[test]
    fn test_select_by_status_only() {
        let mut filter = parse_filter("", &["+v", "+l"]).unwrap();
        let selection = select(&mut filter, &inventory());
        assert_eq!(
            locals(&selection),
            ["proj/vendor/github.com/a/x", "proj/internal/old"]
        );
        assert!(selection.unmatched.is_empty());
    }

    #[test]
    fn test_select_requires_reference_when_given() {
        let mut filter = parse_filter("", &["github.com/a/...", "nothere"]).unwrap();
        let selection = select(&mut filter, &inventory());
        assert_eq!(
            locals(&selection),
            ["proj/vendor/github.com/a/x", "github.com/a/y"]
        );
        assert_eq!(selection.unmatched, vec![PackageSpec::new("nothere")]);
    }

    #[test]
    fn test_reference_recorded_even_when_status_rejects() {
        let mut filter = parse_filter("", &["fmt"]).unwrap();
        let selection = select(&mut filter, &inventory());
        assert!(selection.items.is_empty());
        assert!(selection.unmatched.is_empty());
    }

    #[test]
    fn test_read_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(&path, serde_json::to_string(&inventory()).unwrap()).unwrap();
        assert_eq!(read_inventory(&path).unwrap(), inventory());

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            read_inventory(&path),
            Err(crate::FilterError::Inventory(_))
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let items: Vec<StatusItem> = inventory().into_iter().cycle().take(64).collect();
        for args in [
            vec!["+^u"],
            vec!["+all", "proj/...", "missing/pkg"],
            vec!["+o", "github.com/a/y"],
        ] {
            let mut sequential = parse_filter("", &args[..]).unwrap();
            let mut parallel = sequential.clone();
            assert_eq!(
                select(&mut sequential, &items),
                select_parallel(&mut parallel, &items)
            );
            assert_eq!(sequential, parallel);
        }
    }
}
