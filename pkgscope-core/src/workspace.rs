//! Locating the caller inside the inventory root

use crate::error::FilterError;
use crate::pkgspec;
use std::path::{Component, Path};

/// `dir` relative to `root`, slash-separated with no leading or trailing `/`.
///
/// Relative package references are resolved against this path.
pub fn base_path(root: &Path, dir: &Path) -> crate::Result<String> {
    let rel = dir.strip_prefix(root).map_err(|_| FilterError::BasePath {
        dir: dir.to_path_buf(),
        root: root.to_path_buf(),
    })?;
    let mut segments: Vec<&str> = Vec::new();
    for component in rel.components() {
        if let Component::Normal(segment) = component {
            let segment = segment
                .to_str()
                .ok_or_else(|| FilterError::NonUtf8Path(dir.to_path_buf()))?;
            segments.push(segment);
        }
    }
    Ok(segments.join("/"))
}

/// Base path for parsing `args` from `dir`.
///
/// Outside `root` the base path is only an error when one of the arguments
/// is a relative reference; otherwise it is empty.
pub fn base_path_for<S: AsRef<str>>(
    root: &Path,
    dir: &Path,
    args: &[S],
) -> crate::Result<String> {
    match base_path(root, dir) {
        Err(FilterError::BasePath { dir, root }) => {
            let needs_base = args.iter().any(|arg| {
                let arg: &str = arg.as_ref();
                !arg.starts_with('+') && pkgspec::is_relative(arg)
            });
            if needs_base {
                return Err(FilterError::BasePath { dir, root });
            }
            tracing::debug!(
                dir = %dir.display(),
                root = %root.display(),
                "working directory outside root; using empty base path"
            );
            Ok(String::new())
        }
        other => other,
    }
}

/// [`base_path_for`] from the process working directory
pub fn current_base_path<S: AsRef<str>>(root: &Path, args: &[S]) -> crate::Result<String> {
    let cwd = std::env::current_dir()?;
    base_path_for(root, &cwd, args)
}
