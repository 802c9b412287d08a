mod routes;
mod service;

pub use routes::{configure, get_rating};
pub use service::{QueryService, Rating};
