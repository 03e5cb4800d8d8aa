use async_trait::async_trait;

use chairside_core::{Image, Page, PageQuery, RetentionPolicy, WireRecord};

use crate::error::StoreError;
use crate::filter::{ImageFilter, PolicyFilter, WireFilter};

/// Storage for [`Image`] records.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Listings sort by capture date, newest first.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Insert a new image. Fails with [`StoreError::Conflict`] if the ID
    /// already exists.
    async fn insert(&self, image: Image) -> Result<(), StoreError>;

    /// Fetch an image by ID.
    async fn get(&self, id: &str) -> Result<Option<Image>, StoreError>;

    /// Overwrite an existing image. Fails with [`StoreError::NotFound`]
    /// when the ID is unknown.
    async fn update(&self, image: Image) -> Result<(), StoreError>;

    /// Delete an image. Returns `true` if it existed.
    ///
    /// The legal-hold guard lives above this layer; the store deletes
    /// unconditionally.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Filtered, paginated listing.
    async fn list(&self, filter: &ImageFilter, page: PageQuery) -> Result<Page<Image>, StoreError>;

    /// Number of images currently assigned to the given policy.
    async fn count_by_policy(&self, policy_id: &str) -> Result<u64, StoreError>;

    /// Full snapshot for read-side aggregation (reports).
    ///
    /// May be expensive on large backends; the report endpoints are the
    /// only callers.
    async fn snapshot(&self) -> Result<Vec<Image>, StoreError>;
}

/// Storage for [`RetentionPolicy`] records.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Insert a new policy. Fails with [`StoreError::Conflict`] when the
    /// name is already taken.
    async fn insert(&self, policy: RetentionPolicy) -> Result<(), StoreError>;

    /// Fetch a policy by ID.
    async fn get(&self, id: &str) -> Result<Option<RetentionPolicy>, StoreError>;

    /// Fetch a policy by its unique name.
    async fn get_by_name(&self, name: &str) -> Result<Option<RetentionPolicy>, StoreError>;

    /// Overwrite an existing policy.
    async fn update(&self, policy: RetentionPolicy) -> Result<(), StoreError>;

    /// Delete a policy. Returns `true` if it existed. Reference and
    /// default-flag guards live above this layer.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Filtered, paginated listing, sorted by name.
    async fn list(
        &self,
        filter: &PolicyFilter,
        page: PageQuery,
    ) -> Result<Page<RetentionPolicy>, StoreError>;

    /// The current default policy, if one is set.
    async fn get_default(&self) -> Result<Option<RetentionPolicy>, StoreError>;
}

/// Storage for [`WireRecord`] entries.
#[async_trait]
pub trait WireStore: Send + Sync {
    async fn insert(&self, record: WireRecord) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<Option<WireRecord>, StoreError>;

    /// Filtered, paginated listing, sorted by placement date descending.
    async fn list(
        &self,
        filter: &WireFilter,
        page: PageQuery,
    ) -> Result<Page<WireRecord>, StoreError>;
}
