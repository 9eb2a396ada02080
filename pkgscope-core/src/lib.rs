//! pkgscope Core - status queries over classified package inventories
//!
//! This library provides the status algebra, the filter expression parser
//! and the reference matcher used to select packages from an inventory.

pub mod config;
pub mod error;
pub mod filter;
pub mod keyword;
pub mod pkgspec;
pub mod scan;
pub mod status;
pub mod workspace;

pub use config::Config;
pub use error::{FilterError, PkgSpecError};
pub use filter::{
    parse_filter, parse_filter_with, Filter, FilterImport, FilterOptions, TreeMatch,
};
pub use keyword::{keywords, Keyword, ScopeList};
pub use pkgspec::PackageSpec;
pub use scan::{read_inventory, select, select_parallel, Selected, Selection};
pub use status::{Combinator, Location, Presence, Status, StatusGroup, StatusItem, Type};

/// Result type alias for pkgscope operations
pub type Result<T> = std::result::Result<T, FilterError>;
