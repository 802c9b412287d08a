//! Imports releases from an iTunes / Music `Library.xml` export.
//!
//! The export is a property list with one `<dict>` per track, one key/value pair per
//! line. Only the album and artist fields of each track are of interest here.

use crate::library::Release;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

static STRING_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<key>(Album|Album Artist|Artist)</key>\s*<string>(.*?)</string>")
        .expect("field pattern is valid")
});

/// XML character references: decimal, hexadecimal and the five predefined entities.
static CHARACTER_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|amp|lt|gt|quot|apos);")
        .expect("reference pattern is valid")
});

#[derive(Default)]
struct TrackFields {
    album: Option<String>,
    album_artist: Option<String>,
    artist: Option<String>,
}

impl TrackFields {
    fn into_release(self) -> Option<Release> {
        let album = self.album?;
        let artist = self.album_artist.or(self.artist).unwrap_or_default();
        Some(Release::new(&album, &artist))
    }
}

pub fn import_itunes(path: &Path) -> io::Result<Vec<Release>> {
    let reader = BufReader::new(File::open(path)?);
    parse_library(reader.lines())
}

/// Reads track dictionaries out of the export's lines, one release per track that
/// names an album.
fn parse_library<I>(lines: I) -> io::Result<Vec<Release>>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut releases = Vec::new();
    let mut track = TrackFields::default();

    for line in lines {
        let line = line?;
        let line = line.trim();

        if line == "<dict>" {
            track = TrackFields::default();
            continue;
        }
        if line == "</dict>" {
            if let Some(release) = std::mem::take(&mut track).into_release() {
                releases.push(release);
            }
            continue;
        }
        if let Some(captures) = STRING_FIELD.captures(line) {
            let value = Some(decode_references(&captures[2]));
            match &captures[1] {
                "Album" => track.album = value,
                "Album Artist" => track.album_artist = value,
                _ => track.artist = value,
            }
        }
    }

    Ok(releases)
}

/// Replaces character references with the characters they stand for. A reference
/// naming no valid character is kept as written.
fn decode_references(text: &str) -> String {
    CHARACTER_REFERENCE
        .replace_all(text, |captures: &regex::Captures| {
            let reference = &captures[1];
            let decoded = match reference {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let digits = &reference[1..];
                    let code = match digits.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => digits.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| captures[0].to_string(), String::from)
        })
        .into_owned()
}
