use crate::foundation::database::{Outcome, OutcomeStore, StoreError};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub rating: String,
    pub review_count: String,
}

/// Read-only view over the outcome store. There is no cache of its own, so a rating
/// is visible here as soon as the crawl commits it.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn OutcomeStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn OutcomeStore>) -> Self {
        Self { store }
    }

    /// Returns the rating recorded for `album_slug`, or `None` when the album was not
    /// found on the catalogue or has not been crawled yet.
    pub fn lookup(&self, album_slug: &str) -> Result<Option<Rating>, StoreError> {
        Ok(match self.store.get(album_slug)? {
            Some(Outcome::Found {
                rating,
                review_count,
            }) => Some(Rating {
                rating,
                review_count,
            }),
            Some(Outcome::Missing) | None => None,
        })
    }
}
