use async_trait::async_trait;
use dashmap::DashMap;

use chairside_core::{Image, Page, PageQuery};
use chairside_store::{ImageFilter, ImageStore, StoreError};

/// In-memory [`ImageStore`] backed by a [`DashMap`].
///
/// Listings materialize the matching set, sort by capture date descending
/// and slice the requested page. Fine for development and tests.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: DashMap<String, Image>,
}

impl MemoryImageStore {
    /// Create a new, empty in-memory image store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(filter: &ImageFilter, image: &Image) -> bool {
        if let Some(category) = filter.category
            && image.category != category
        {
            return false;
        }
        if let Some(tier) = filter.storage_tier
            && image.storage_tier != tier
        {
            return false;
        }
        if let Some(hold) = filter.legal_hold
            && image.legal_hold_active() != hold
        {
            return false;
        }
        if let Some(ref policy_id) = filter.policy_id
            && image.policy_id.as_deref() != Some(policy_id.as_str())
        {
            return false;
        }
        if let Some(has_policy) = filter.has_policy
            && image.policy_id.is_some() != has_policy
        {
            return false;
        }
        if let Some(from) = filter.captured_from
            && image.captured_at < from
        {
            return false;
        }
        if let Some(to) = filter.captured_to
            && image.captured_at > to
        {
            return false;
        }
        true
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn insert(&self, image: Image) -> Result<(), StoreError> {
        match self.images.entry(image.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "image {} already exists",
                image.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(image);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Image>, StoreError> {
        Ok(self.images.get(id).map(|i| i.value().clone()))
    }

    async fn update(&self, image: Image) -> Result<(), StoreError> {
        match self.images.entry(image.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                occupied.insert(image);
                Ok(())
            }
            dashmap::mapref::entry::Entry::Vacant(_) => {
                Err(StoreError::not_found("image", image.id))
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.images.remove(id).is_some())
    }

    async fn list(&self, filter: &ImageFilter, page: PageQuery) -> Result<Page<Image>, StoreError> {
        let page = page.normalized();

        let mut matching: Vec<Image> = self
            .images
            .iter()
            .filter(|entry| Self::matches(filter, entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));

        let total = matching.len() as u64;
        let items: Vec<Image> = matching
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(items, total, page.page, page.page_size))
    }

    async fn count_by_policy(&self, policy_id: &str) -> Result<u64, StoreError> {
        let count = self
            .images
            .iter()
            .filter(|entry| entry.value().policy_id.as_deref() == Some(policy_id))
            .count();
        Ok(count as u64)
    }

    async fn snapshot(&self) -> Result<Vec<Image>, StoreError> {
        Ok(self
            .images
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chairside_core::{ImageCategory, StorageTier};
    use chrono::{Duration, Utc};

    fn image(id: &str, category: ImageCategory, tier: StorageTier, age_days: i64) -> Image {
        let captured = Utc::now() - Duration::days(age_days);
        Image {
            id: id.into(),
            file_name: format!("{id}.dcm"),
            category,
            captured_at: captured,
            size_bytes: 1_024,
            patient_minor: false,
            storage_tier: tier,
            policy_id: None,
            legal_hold: None,
            last_accessed_at: None,
            created_at: captured,
            updated_at: captured,
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = MemoryImageStore::new();
        store
            .insert(image("img_1", ImageCategory::Cbct, StorageTier::Hot, 1))
            .await
            .unwrap();
        let err = store
            .insert(image("img_1", ImageCategory::Cbct, StorageTier::Hot, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_filters_and_sorts_newest_first() {
        let store = MemoryImageStore::new();
        store
            .insert(image("old", ImageCategory::Cbct, StorageTier::Hot, 30))
            .await
            .unwrap();
        store
            .insert(image("new", ImageCategory::Cbct, StorageTier::Hot, 1))
            .await
            .unwrap();
        store
            .insert(image("photo", ImageCategory::IntraoralPhoto, StorageTier::Hot, 2))
            .await
            .unwrap();

        let page = store
            .list(
                &ImageFilter {
                    category: Some(ImageCategory::Cbct),
                    ..ImageFilter::default()
                },
                PageQuery::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id, "new");
        assert_eq!(page.items[1].id, "old");
    }

    #[tokio::test]
    async fn list_pagination_math_holds() {
        let store = MemoryImageStore::new();
        for i in 0..7 {
            store
                .insert(image(
                    &format!("img_{i}"),
                    ImageCategory::Other,
                    StorageTier::Hot,
                    i,
                ))
                .await
                .unwrap();
        }

        let page = store
            .list(
                &ImageFilter::default(),
                PageQuery {
                    page: 3,
                    page_size: 3,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 1);
        assert!(page.items.len() <= page.page_size as usize);
    }

    #[tokio::test]
    async fn count_by_policy_tracks_assignments() {
        let store = MemoryImageStore::new();
        let mut a = image("a", ImageCategory::Cbct, StorageTier::Hot, 1);
        a.policy_id = Some("pol_1".into());
        store.insert(a).await.unwrap();
        store
            .insert(image("b", ImageCategory::Cbct, StorageTier::Hot, 1))
            .await
            .unwrap();

        assert_eq!(store.count_by_policy("pol_1").await.unwrap(), 1);
        assert_eq!(store.count_by_policy("pol_2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_requires_existing_record() {
        let store = MemoryImageStore::new();
        let img = image("img_1", ImageCategory::Cbct, StorageTier::Hot, 1);
        assert!(matches!(
            store.update(img.clone()).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
        store.insert(img.clone()).await.unwrap();
        let mut updated = img;
        updated.storage_tier = StorageTier::Cold;
        store.update(updated).await.unwrap();
        assert!(store.get("img_1").await.unwrap().unwrap().is_archived());
    }
}
