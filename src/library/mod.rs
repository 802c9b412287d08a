//! Importers turning a music library into the list of releases to crawl.

mod folders;
mod itunes;

pub use folders::import_folders;
pub use itunes::import_itunes;

use serde::Deserialize;
use std::collections::HashSet;
use std::io;
use std::path::Path;

/// One album of the library, as the library names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub title: String,
    pub artist: String,
}

impl Release {
    pub fn new(title: &str, artist: &str) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryFormat {
    /// An iTunes / Music `Library.xml` export.
    Itunes,
    /// A `root/Artist/Album/` directory tree.
    Folders,
}

/// Imports the library at `path` and drops repeated albums, keeping the first.
pub fn import_library(path: &Path, format: LibraryFormat) -> io::Result<Vec<Release>> {
    let releases = match format {
        LibraryFormat::Itunes => import_itunes(path)?,
        LibraryFormat::Folders => import_folders(path)?,
    };
    Ok(dedup_releases(releases))
}

/// Removes releases naming the same album and artist as an earlier one, ignoring case.
pub fn dedup_releases(releases: Vec<Release>) -> Vec<Release> {
    let mut seen = HashSet::new();
    releases
        .into_iter()
        .filter(|release| seen.insert((release.title.to_lowercase(), release.artist.to_lowercase())))
        .collect()
}
