use async_trait::async_trait;

use chairside_core::{ArchiveRecord, Page, PageQuery};

use crate::error::ArchiveLogError;
use crate::query::ArchiveQuery;

/// Trait for archive history storage backends.
///
/// The log is append-only: records are never mutated or deleted once
/// written. Implementations must be `Send + Sync`.
#[async_trait]
pub trait ArchiveLog: Send + Sync {
    /// Append a record.
    async fn append(&self, record: ArchiveRecord) -> Result<(), ArchiveLogError>;

    /// Query records with filters and pagination, newest first.
    async fn query(
        &self,
        query: &ArchiveQuery,
        page: PageQuery,
    ) -> Result<Page<ArchiveRecord>, ArchiveLogError>;

    /// Full history for one image, newest first.
    async fn for_image(&self, image_id: &str) -> Result<Vec<ArchiveRecord>, ArchiveLogError>;
}
