use thiserror::Error;

/// A fetch that did not produce a usable document. Always transient: the release is
/// left unresolved and tried again on a later run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// The rating markup is there but not in the expected shape. Usually a layout change
/// on the catalogue side rather than an absent album, so it is never cached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedDocumentError {
    #[error("label `{0}` is not closed by a `</span>` tag")]
    Unterminated(&'static str),
    #[error("label `{0}` is not followed by value markup")]
    NoValueMarkup(&'static str),
    #[error("label `{0}` has an empty value")]
    EmptyValue(&'static str),
    #[error("label `{0}` is absent while its companion label is present")]
    MissingLabel(&'static str),
}
