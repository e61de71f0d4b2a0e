// Declare sub-modules within the application layer
pub mod commands;
pub mod error;
pub mod middleware;
pub mod query;

pub use error::ApplicationError;
