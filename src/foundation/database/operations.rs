use crate::foundation::database::{Outcome, StoreError};
use sled::Db;
use std::io;

/// Key prefix separating per-album outcomes from anything else kept in the same database.
pub const ALBUM_KEY_PREFIX: &str = "album:";

/// Opens a database at the specified path.
///
/// This function creates a new database or opens an existing one at the given path.
/// It's a friendly wrapper around `sled::open` that converts the error to a standard
/// IO error for easier error handling.
///
/// # Examples
///
/// ```no_run
/// use musrank::open_database;
/// let db = open_database("/path/to/my/database")?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn open_database(path: &str) -> io::Result<Db> {
    sled::open(path).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

/// Durable map from album slug to its [`Outcome`].
///
/// Every write replaces the whole value for a key in one step, so a reader sees either
/// the previous outcome or the new one, never a half-written pair. Writes are
/// idempotent: repeating one with the same values leaves the store unchanged.
#[cfg_attr(test, mockall::automock)]
pub trait OutcomeStore: Send + Sync {
    /// Returns the most recently committed outcome for `album_slug`, if any.
    fn get(&self, album_slug: &str) -> Result<Option<Outcome>, StoreError>;

    fn put_found(
        &self,
        album_slug: &str,
        rating: &str,
        review_count: &str,
    ) -> Result<(), StoreError>;

    fn put_missing(&self, album_slug: &str) -> Result<(), StoreError>;

    /// Number of albums with a recorded outcome.
    fn len(&self) -> Result<usize, StoreError>;
}

/// [`OutcomeStore`] backed by a sled database.
#[derive(Clone)]
pub struct SledOutcomeStore {
    db: Db,
}

impl SledOutcomeStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn key(album_slug: &str) -> String {
        format!("{}{}", ALBUM_KEY_PREFIX, album_slug)
    }

    fn commit(&self, album_slug: &str, outcome: &Outcome) -> Result<(), StoreError> {
        let serialized = bincode::serialize(outcome)?;
        self.db.insert(Self::key(album_slug).as_bytes(), serialized)?;
        self.db.flush()?;
        Ok(())
    }
}

impl OutcomeStore for SledOutcomeStore {
    fn get(&self, album_slug: &str) -> Result<Option<Outcome>, StoreError> {
        self.db
            .get(Self::key(album_slug).as_bytes())?
            .map(|ivec| bincode::deserialize(&ivec).map_err(StoreError::from))
            .transpose()
    }

    fn put_found(
        &self,
        album_slug: &str,
        rating: &str,
        review_count: &str,
    ) -> Result<(), StoreError> {
        self.commit(album_slug, &Outcome::found(rating, review_count))
    }

    fn put_missing(&self, album_slug: &str) -> Result<(), StoreError> {
        self.commit(album_slug, &Outcome::Missing)
    }

    fn len(&self) -> Result<usize, StoreError> {
        let mut count = 0;
        for entry in self.db.scan_prefix(ALBUM_KEY_PREFIX.as_bytes()) {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}
