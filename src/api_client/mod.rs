mod errors;
mod extract;
mod fetch;

pub use errors::{MalformedDocumentError, TransportError};
pub use extract::*;
pub use fetch::*;
