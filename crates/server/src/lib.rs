pub mod api;
pub mod config;
pub mod error;
pub mod seed;
pub mod session;

pub use error::ApiError;
