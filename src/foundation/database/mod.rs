mod models;
mod operations;
mod store_error;

pub use models::*;
pub use operations::*;
pub use store_error::StoreError;
