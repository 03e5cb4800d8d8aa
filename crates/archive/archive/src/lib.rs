pub mod error;
pub mod log;
pub mod query;

pub use error::ArchiveLogError;
pub use log::ArchiveLog;
pub use query::ArchiveQuery;
