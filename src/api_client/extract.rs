//! Recovers the average rating and the review count from a fetched release page.
//!
//! Each value is located by its label, then read from a bounded window that ends at the
//! next closing `</span>` tag. Nothing here slices past the end of the document: a page
//! whose markup does not match is reported as [`MalformedDocumentError`] instead.

use crate::api_client::MalformedDocumentError;
use crate::foundation::database::Outcome;

/// Label marking the average rating, e.g. `<span class="avg_rating">  4.27</span>`.
pub const RATING_LABEL: &str = "avg_rating";
/// Label marking the review count, whose value sits in a nested span:
/// `<span class="num_ratings">Ratings: <span >1,234</span>`.
pub const REVIEW_COUNT_LABEL: &str = "num_ratings";

const CLOSING_TAG: &str = "</span>";
const NESTED_TAG: &str = "<span";

/// Extracts the release outcome from a page body.
///
/// Returns [`Outcome::Missing`] when neither label is present, which is how the
/// catalogue renders a release it does not know.
///
/// # Examples
///
/// ```
/// use musrank::api_client::extract;
/// use musrank::Outcome;
///
/// let page = r#"<span class="avg_rating">  4.27</span>
///     <span class="num_ratings">Ratings: <b><span >1,024</span></b></span>"#;
/// assert_eq!(extract(page), Ok(Outcome::found("4.27", "1,024")));
/// assert_eq!(extract("<html>not found</html>"), Ok(Outcome::Missing));
/// ```
pub fn extract(document: &str) -> Result<Outcome, MalformedDocumentError> {
    let rating_window = label_window(document, RATING_LABEL)?;
    let count_window = label_window(document, REVIEW_COUNT_LABEL)?;

    match (rating_window, count_window) {
        (None, None) => Ok(Outcome::Missing),
        (None, Some(_)) => Err(MalformedDocumentError::MissingLabel(RATING_LABEL)),
        (Some(_), None) => Err(MalformedDocumentError::MissingLabel(REVIEW_COUNT_LABEL)),
        (Some(rating_window), Some(count_window)) => {
            let rating = value_after(rating_window, 0, RATING_LABEL)?;
            let nested = count_window
                .rfind(NESTED_TAG)
                .ok_or(MalformedDocumentError::NoValueMarkup(REVIEW_COUNT_LABEL))?;
            let review_count = value_after(count_window, nested, REVIEW_COUNT_LABEL)?;
            Ok(Outcome::found(rating, review_count))
        }
    }
}

/// The text between the first occurrence of `label` and the next closing tag, or
/// `None` when the label does not occur.
fn label_window<'a>(
    document: &'a str,
    label: &'static str,
) -> Result<Option<&'a str>, MalformedDocumentError> {
    let Some(start) = document.find(label) else {
        return Ok(None);
    };
    let rest = &document[start + label.len()..];
    let end = rest
        .find(CLOSING_TAG)
        .ok_or(MalformedDocumentError::Unterminated(label))?;
    Ok(Some(&rest[..end]))
}

/// The trimmed text following the first `>` at or after `from` in `window`.
fn value_after<'a>(
    window: &'a str,
    from: usize,
    label: &'static str,
) -> Result<&'a str, MalformedDocumentError> {
    let open_end = window[from..]
        .find('>')
        .ok_or(MalformedDocumentError::NoValueMarkup(label))?;
    let value = window[from + open_end + 1..].trim();

    if value.is_empty() {
        return Err(MalformedDocumentError::EmptyValue(label));
    }
    if value.contains('<') {
        return Err(MalformedDocumentError::NoValueMarkup(label));
    }
    Ok(value)
}
