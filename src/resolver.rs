//! Resolves solidity imports against a dependency root

use crate::artifacts::{Source, Sources};
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// The outcome of looking up a single import path.
///
/// Resolution never fails: a missing or unreadable file is a
/// [`ImportResolution::NotFound`] value, so the decision whether an
/// unresolved import is fatal stays with the compiler.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ImportResolution {
    /// The import was found under the dependency root
    Found {
        /// On-disk location of the resolved file
        path: PathBuf,
        /// Its content
        source: Source,
    },
    /// Nothing readable at the import path
    NotFound {
        /// The import path as written in the source
        import: String,
        /// What went wrong looking it up
        reason: String,
    },
}

/// Looks up import paths below a single dependency root, conventionally the
/// install directory of the contract's library dependencies.
#[derive(Debug, Clone)]
pub struct LibraryResolver {
    root: PathBuf,
}

impl LibraryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured dependency root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a single import path to file content under the root
    pub fn resolve(&self, import: &str) -> ImportResolution {
        let path = self.root.join(import);
        if !path.is_file() {
            return ImportResolution::NotFound {
                import: import.to_string(),
                reason: format!("\"{}\" is not a file", path.display()),
            }
        }
        match Source::read(&path) {
            Ok(source) => ImportResolution::Found { path, source },
            Err(err) => ImportResolution::NotFound {
                import: import.to_string(),
                reason: err.to_string(),
            },
        }
    }

    /// Adds every import reachable from `sources` to the map, keyed by the
    /// import path the compiler will request, and returns the imports that
    /// could not be resolved.
    ///
    /// Imports of resolved libraries are followed as well, so a library that
    /// itself imports another library pulls the whole chain into the source
    /// map.
    pub fn expand_sources(&self, sources: &mut Sources) -> Vec<String> {
        let mut unresolved = Vec::new();
        let mut pending: Vec<String> = sources
            .values()
            .flat_map(Source::parse_imports)
            .map(str::to_string)
            .collect();

        while let Some(import) = pending.pop() {
            if sources.contains_key(&import) || unresolved.contains(&import) {
                continue
            }
            match self.resolve(&import) {
                ImportResolution::Found { path, source } => {
                    trace!(import = %import, path = %path.display(), "resolved library import");
                    let nested: Vec<String> =
                        source.parse_imports().into_iter().map(str::to_string).collect();
                    pending.extend(nested);
                    sources.insert(import, source);
                }
                ImportResolution::NotFound { import, reason } => {
                    warn!(import = %import, %reason, "could not resolve import, leaving it to the compiler");
                    unresolved.push(import);
                }
            }
        }
        unresolved
    }
}
