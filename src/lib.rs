pub mod api_client;
pub mod configuration;
pub mod foundation;
pub mod library;
pub mod process;
pub mod query;
pub mod startup;

pub use api_client::{extract, Fetcher, HttpFetcher};
pub use configuration::*;
pub use foundation::database::*;
pub use foundation::utils::{normalize, CanonicalKey};
pub use library::{import_library, Release};
pub use process::{CrawlReport, CrawlScheduler, Pacing};
pub use query::QueryService;
