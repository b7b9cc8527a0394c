pub mod error;
pub mod handlers;
pub mod routes;
pub mod static_files;

pub use error::{ApiError, ErrorResponse};
pub use routes::{create_api_router, create_app, API_PREFIX};
