//! @ai:module:intent Expand file patterns from benchmark and table definitions into paths
//! @ai:module:layer infrastructure
//! @ai:module:public_api PatternExpander, GlobExpander
//! @ai:module:stateless true

use crate::error::{Error, Result};
use globset::GlobBuilder;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Capability for turning a file pattern into concrete paths
pub trait PatternExpander: Send + Sync {
    /// @ai:intent Expand a pattern relative to base_dir.
    ///            Literals pass through unchanged; globs yield their matches in path order.
    fn expand(&self, pattern: &str, base_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// @ai:intent Filesystem glob expander
/// @ai:effects pure (stateless)
pub struct GlobExpander;

impl GlobExpander {
    /// @ai:intent Create a new glob expander
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for GlobExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Check whether a pattern contains glob metacharacters
/// @ai:effects pure
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Literal directory prefix to walk, the maximum depth a match can live at below it,
/// and whether the prefix is an implicit `.`
fn walk_root(pattern: &Path) -> (PathBuf, Option<usize>, bool) {
    let mut root = PathBuf::new();
    let mut rest = Vec::new();

    for component in pattern.components() {
        let text = component.as_os_str().to_string_lossy();

        if rest.is_empty() && !is_glob(&text) {
            root.push(component);
        } else {
            rest.push(component);
        }
    }

    let implicit = root.as_os_str().is_empty();
    if implicit {
        root.push(Component::CurDir);
    }

    let recursive = rest
        .iter()
        .any(|c| c.as_os_str().to_string_lossy().contains("**"));
    let depth = if recursive { None } else { Some(rest.len()) };
    (root, depth, implicit)
}

impl PatternExpander for GlobExpander {
    /// @ai:effects fs:read
    fn expand(&self, pattern: &str, base_dir: &Path) -> Result<Vec<PathBuf>> {
        let joined = base_dir.join(pattern);

        if !is_glob(pattern) {
            return Ok(vec![joined]);
        }

        let glob_text = joined.to_string_lossy().to_string();
        let matcher = GlobBuilder::new(&glob_text)
            .literal_separator(true)
            .build()
            .map_err(|source| Error::Pattern {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();

        let (root, depth, implicit) = walk_root(&joined);
        let mut walker = WalkDir::new(&root).min_depth(1);
        if let Some(depth) = depth {
            walker = walker.max_depth(depth);
        }

        let mut matches: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .map(|p| match p.strip_prefix(".") {
                Ok(relative) if implicit => relative.to_path_buf(),
                _ => p,
            })
            .filter(|p| matcher.is_match(p))
            .collect();

        matches.sort();

        if matches.is_empty() {
            tracing::warn!(
                "Pattern {} in {} does not match any file",
                pattern,
                base_dir.display()
            );
        }

        Ok(matches)
    }
}
