use std::path::PathBuf;

use thiserror::Error;

/// Fatal startup conditions. Anything past startup reports through `anyhow`.
#[derive(Debug, Error)]
pub enum Error {
    /// The manifest resource could not be read.
    #[error("failed to fetch manifest {}: {source}", .path.display())]
    ManifestFetch {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The manifest resource is not a flat JSON list of filename strings.
    #[error("failed to parse manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The manifest parsed but lists no media files.
    #[error("manifest {} lists no media files", .0.display())]
    EmptyManifest(PathBuf),
}
