use std::fs;
use std::path::Path;

use crate::error::Error;

/// Ordered list of media filenames driving the show. Loaded once at startup
/// from a flat JSON array; immutable afterwards.
#[derive(Debug, Clone)]
pub struct Manifest {
    entries: Vec<String>,
}

impl Manifest {
    /// Fetch and parse the manifest resource. Any failure here is fatal to
    /// startup: unreadable, unparsable and empty manifests all refuse to
    /// produce a `Manifest`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path).map_err(|source| Error::ManifestFetch {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<String> =
            serde_json::from_str(&raw).map_err(|source| Error::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_entries(entries).ok_or_else(|| Error::EmptyManifest(path.to_path_buf()))
    }

    /// Build a manifest from an already-materialized list. `None` when the
    /// list is empty.
    pub fn from_entries(entries: Vec<String>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        // Constructors refuse empty lists, so this only exists for symmetry.
        self.entries.is_empty()
    }

    pub fn file_name(&self, index: usize) -> &str {
        &self.entries[index]
    }

    /// Modulo cursor: wraps to 0 after the last entry.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
