use serde::{Deserialize, Serialize};

/// The resolved state of one album slug. Absence from the store means "not yet attempted".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found { rating: String, review_count: String },
    Missing,
}

impl Outcome {
    pub fn found(rating: &str, review_count: &str) -> Self {
        Outcome::Found {
            rating: rating.to_string(),
            review_count: review_count.to_string(),
        }
    }
}
