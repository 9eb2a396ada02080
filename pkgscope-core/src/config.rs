//! Configuration for pkgscope

use crate::filter::{FilterOptions, TreeMatch};
use crate::keyword::ScopeList;
use crate::FilterError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up in the inventory root
pub const CONFIG_FILE: &str = ".pkgscope.toml";

/// Default configuration as TOML
pub const DEFAULT_CONFIG: &str = r#"# pkgscope configuration

[scope]
# Universe added to filters that only exclude (normal, all, outside)
fallback = "normal"

[matching]
# Tree references ("foo/...") only match whole path segments.
# Set to false to match any path starting with the reference.
tree_boundary = true
# Evaluate the inventory on all cores
parallel = false
"#;

/// pkgscope configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeConfig {
    #[serde(default)]
    pub fallback: ScopeList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_tree_boundary")]
    pub tree_boundary: bool,
    #[serde(default)]
    pub parallel: bool,
}

fn default_tree_boundary() -> bool {
    true
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tree_boundary: default_tree_boundary(),
            parallel: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load `.pkgscope.toml` from `root`, or the defaults if there is none
    pub fn discover(root: &Path) -> crate::Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| FilterError::ConfigParse(e.to_string()))
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            fallback: self.scope.fallback,
            tree_match: if self.matching.tree_boundary {
                TreeMatch::Boundary
            } else {
                TreeMatch::Prefix
            },
        }
    }
}
