//! Error types for pkgscope operations

use std::path::PathBuf;

/// Reasons a package reference can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PkgSpecError {
    #[error("empty package path")]
    EmptyPath,

    #[error("empty version after '@'")]
    EmptyVersion,

    #[error("empty origin after '::'")]
    EmptyOrigin,

    #[error("relative path escapes the inventory root")]
    EscapesRoot,
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("unknown status {0:?}")]
    UnknownStatus(String),

    #[error("invalid package reference {reference:?}: {source}")]
    InvalidPackageReference {
        reference: String,
        #[source]
        source: PkgSpecError,
    },

    #[error("{} is not inside the inventory root {}", .dir.display(), .root.display())]
    BasePath { dir: PathBuf, root: PathBuf },

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Inventory parse error: {0}")]
    Inventory(#[from] serde_json::Error),
}
