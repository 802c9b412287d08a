mod crawl;
mod pacing;

pub use crawl::*;
pub use pacing::{Pacing, PacingError};
