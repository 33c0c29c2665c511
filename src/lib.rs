// Library root for the School REST API

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod handlers;

// Re-export commonly used types
pub use db::Database;
pub use error::ApiError;
pub use handlers::create_router;
pub use models::{CreateSchoolRequest, ListSchoolsQuery, School, SchoolWithDistance};
