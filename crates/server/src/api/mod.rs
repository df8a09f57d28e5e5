pub mod cache;
pub mod collections;
pub mod error;
pub mod handlers;
pub mod matches;
pub mod middleware;
pub mod routes;
pub mod saved;
pub mod search;

pub use error::ApiError;
pub use routes::create_router;
