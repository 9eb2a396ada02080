//! Package reference syntax: `path[/...][::origin][@version]`

use crate::error::PkgSpecError;
use serde::{Deserialize, Serialize};
use std::fmt;

const TREE_SUFFIX: &str = "...";

/// A user-supplied package reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Slash-separated path relative to the inventory root
    pub path: String,
    /// Also match every package nested under `path`
    pub match_tree: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PackageSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            match_tree: false,
            origin: None,
            version: None,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            match_tree: true,
            ..Self::new(path)
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if self.match_tree {
            if self.path.is_empty() {
                f.write_str(TREE_SUFFIX)?;
            } else {
                write!(f, "/{}", TREE_SUFFIX)?;
            }
        }
        if let Some(origin) = &self.origin {
            write!(f, "::{}", origin)?;
        }
        if let Some(version) = &self.version {
            write!(f, "@{}", version)?;
        }
        Ok(())
    }
}

/// Parse a raw reference. Relative paths (starting with `.`) are resolved
/// against `base_path`, itself relative to the inventory root.
pub fn parse(base_path: &str, raw: &str) -> Result<PackageSpec, PkgSpecError> {
    let parts = split(raw)?;

    let path = if is_relative_path(&parts.path) {
        clean(&format!("{}/{}", base_path, parts.path))?
    } else {
        clean(&parts.path)?
    };

    if path.is_empty() && !parts.match_tree {
        return Err(PkgSpecError::EmptyPath);
    }

    Ok(PackageSpec {
        path,
        match_tree: parts.match_tree,
        origin: parts.origin,
        version: parts.version,
    })
}

/// Whether `raw` names a path relative to the caller, so that parsing it
/// needs a base path
pub fn is_relative(raw: &str) -> bool {
    split(raw).is_ok_and(|parts| is_relative_path(&parts.path))
}

/// A reference with its suffixes removed; the path is not yet cleaned
struct Parts {
    path: String,
    match_tree: bool,
    origin: Option<String>,
    version: Option<String>,
}

fn split(raw: &str) -> Result<Parts, PkgSpecError> {
    let mut rest = raw.replace('\\', "/");

    let version = match rest.rfind('@') {
        Some(at) => {
            let version = rest[at + 1..].to_string();
            if version.is_empty() {
                return Err(PkgSpecError::EmptyVersion);
            }
            rest.truncate(at);
            Some(version)
        }
        None => None,
    };

    let origin = match rest.find("::") {
        Some(sep) => {
            let origin = rest[sep + 2..].trim_matches('/').to_string();
            if origin.is_empty() {
                return Err(PkgSpecError::EmptyOrigin);
            }
            rest.truncate(sep);
            Some(origin)
        }
        None => None,
    };

    let mut path = rest.trim_end_matches('/');
    let mut match_tree = false;
    if path == TREE_SUFFIX {
        match_tree = true;
        path = "";
    } else if let Some(stripped) = path.strip_suffix(TREE_SUFFIX) {
        if stripped.ends_with('/') {
            match_tree = true;
            path = stripped;
        }
    }

    Ok(Parts {
        path: path.to_string(),
        match_tree,
        origin,
        version,
    })
}

fn is_relative_path(path: &str) -> bool {
    path == "." || path == ".." || path.starts_with("./") || path.starts_with("../")
}

/// Collapse empty, `.` and `..` segments
fn clean(path: &str) -> Result<String, PkgSpecError> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(PkgSpecError::EscapesRoot);
                }
            }
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}
