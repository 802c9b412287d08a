//! Turns raw library titles and artist names into the slugs the catalogue uses in its
//! `/artist-slug/album-slug` URLs.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Marketing qualifiers that never appear in catalogue album slugs.
const QUALIFIERS: [&str; 7] = [
    "ep",
    "deluxe",
    "single",
    "remastered",
    "edition",
    "expanded",
    "version",
];

/// An ampersand as it shows up in exported metadata: the `&#38;` entity, its named
/// form, the bare character, or the stray `38` left behind when the entity was mangled.
static AMPERSAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#38;|&amp;|&|\b38\b").expect("ampersand pattern is valid"));

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^-_/a-zA-Z0-9]+").expect("slug pattern is valid"));

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[.*?\]").expect("bracket pattern is valid"));

/// The pair of slugs identifying one release on the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub album_slug: String,
    pub artist_slug: String,
}

impl CanonicalKey {
    /// Builds the release page URL below `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        format!("{}/{}/{}", base, self.artist_slug, self.album_slug)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("album title {0:?} normalizes to an empty slug")]
    EmptyAlbum(String),
    #[error("artist name {0:?} normalizes to an empty slug")]
    EmptyArtist(String),
}

/// Normalizes a release title and artist into a [`CanonicalKey`].
///
/// The function is pure: equal inputs always give equal keys, which keeps the
/// outcome store's key space stable across repeated imports of the same library.
///
/// # Examples
///
/// ```
/// use musrank::foundation::utils::normalize;
///
/// let key = normalize("Whats Your Pleasure", "Jessie Ware").unwrap();
/// assert_eq!(key.album_slug, "whats-your-pleasure");
/// assert_eq!(key.artist_slug, "jessie-ware");
/// ```
pub fn normalize(title: &str, artist: &str) -> Result<CanonicalKey, NormalizationError> {
    let album_slug = album_slug(title);
    if album_slug.is_empty() {
        return Err(NormalizationError::EmptyAlbum(title.to_string()));
    }

    let artist_slug = artist_slug(artist);
    if artist_slug.is_empty() {
        return Err(NormalizationError::EmptyArtist(artist.to_string()));
    }

    Ok(CanonicalKey {
        album_slug,
        artist_slug,
    })
}

/// Album slug: qualifiers are dropped before the shared slug steps.
pub fn album_slug(title: &str) -> String {
    let lowered = fold(title);
    slugify(&strip_qualifiers(&lowered))
}

/// Drops qualifier words delimited by spaces, parentheses or the string edges. A
/// hyphenated word such as `single-handed` is one word and is kept whole.
fn strip_qualifiers(title: &str) -> String {
    title
        .split(' ')
        .map(|token| {
            let word = token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '-'));
            if QUALIFIERS.contains(&word) {
                token.replacen(word, "", 1)
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn artist_slug(artist: &str) -> String {
    slugify(&fold(artist))
}

/// Trims, lower-cases and decomposes accented characters so that only their base
/// letter survives the character filter.
fn fold(input: &str) -> String {
    normalize_unicode(input.trim())
}

fn slugify(input: &str) -> String {
    let joined = AMPERSAND.replace_all(input, "and");
    let dashed = joined.replace(' ', "-").replace('/', "_");
    let filtered = DISALLOWED.replace_all(&dashed, "");
    filtered.trim_matches('-').to_string()
}

/// Removes bracketed annotations such as `[FLAC]` or `[2024]` from a folder name.
///
/// # Examples
///
/// ```
/// use musrank::foundation::utils::clean_album_name;
///
/// assert_eq!(clean_album_name("Blue Lines [FLAC]"), "Blue Lines");
/// ```
pub fn clean_album_name(name: &str) -> String {
    BRACKETED.replace_all(name, "").trim().to_string()
}

/// NFD-decomposes and lower-cases `input`.
pub fn normalize_unicode(input: &str) -> String {
    input.nfd().collect::<String>().to_lowercase()
}
