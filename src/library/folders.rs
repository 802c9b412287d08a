//! Imports releases from a music directory laid out as `root/Artist/Album/`.
//!
//! Each immediate subdirectory of the root is an artist; each of its subdirectories
//! holding at least one audio file is an album.

use crate::foundation::utils::clean_album_name;
use crate::library::Release;
use rayon::prelude::*;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Supported audio file extensions.
const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "flac", "wav", "m4a"];

/// Collects the releases found below `root`.
///
/// Artist folders are scanned in parallel; the result is sorted by artist and title so
/// repeated imports of an unchanged tree yield the same order.
///
/// # Arguments
///
/// * `root` - The path to the root directory of the music collection.
///
pub fn import_folders(root: &Path) -> io::Result<Vec<Release>> {
    let per_artist: Vec<Vec<Release>> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .par_bridge()
        .map(|entry| match entry {
            Ok(entry) if entry.path().is_dir() => {
                let path = entry.path();
                let artist_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidData, "Invalid artist name")
                })?;
                Ok(collect_albums(path, artist_name))
            }
            Ok(_) => Ok(Vec::new()),
            Err(e) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Failed to read directory entry. Details: {}", e),
            )),
        })
        .collect::<io::Result<_>>()?;

    let mut releases: Vec<Release> = per_artist.into_iter().flatten().collect();
    releases.sort_by(|a, b| (&a.artist, &a.title).cmp(&(&b.artist, &b.title)));
    Ok(releases)
}

/// Collect the albums of one artist folder.
fn collect_albums(artist_path: &Path, artist_name: &str) -> Vec<Release> {
    WalkDir::new(artist_path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir() && has_audio_files(entry.path()))
        .filter_map(|entry| {
            let album_name = clean_album_name(entry.file_name().to_str()?);
            (!album_name.is_empty()).then(|| Release::new(&album_name, artist_name))
        })
        .collect()
}

/// Check if a directory contains any audio files.
fn has_audio_files(path: &Path) -> bool {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .any(|e| is_audio_file(e.path()))
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
