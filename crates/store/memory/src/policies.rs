use async_trait::async_trait;
use dashmap::DashMap;

use chairside_core::{Page, PageQuery, RetentionPolicy};
use chairside_store::{PolicyFilter, PolicyStore, StoreError};

/// In-memory [`PolicyStore`] backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    policies: DashMap<String, RetentionPolicy>,
}

impl MemoryPolicyStore {
    /// Create a new, empty in-memory policy store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(filter: &PolicyFilter, policy: &RetentionPolicy) -> bool {
        if let Some(active) = filter.active
            && policy.active != active
        {
            return false;
        }
        if let Some(category) = filter.category
            && !policy.applies_to(category)
        {
            return false;
        }
        true
    }

    fn name_taken(&self, name: &str, excluding_id: &str) -> bool {
        self.policies.iter().any(|entry| {
            entry.value().id != excluding_id && entry.value().name.eq_ignore_ascii_case(name)
        })
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn insert(&self, policy: RetentionPolicy) -> Result<(), StoreError> {
        if self.name_taken(&policy.name, &policy.id) {
            return Err(StoreError::Conflict(format!(
                "a policy named {:?} already exists",
                policy.name
            )));
        }
        match self.policies.entry(policy.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "policy {} already exists",
                policy.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(policy);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<RetentionPolicy>, StoreError> {
        Ok(self.policies.get(id).map(|p| p.value().clone()))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<RetentionPolicy>, StoreError> {
        Ok(self
            .policies
            .iter()
            .find(|entry| entry.value().name.eq_ignore_ascii_case(name))
            .map(|entry| entry.value().clone()))
    }

    async fn update(&self, policy: RetentionPolicy) -> Result<(), StoreError> {
        if self.name_taken(&policy.name, &policy.id) {
            return Err(StoreError::Conflict(format!(
                "a policy named {:?} already exists",
                policy.name
            )));
        }
        match self.policies.entry(policy.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                occupied.insert(policy);
                Ok(())
            }
            dashmap::mapref::entry::Entry::Vacant(_) => {
                Err(StoreError::not_found("policy", policy.id))
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.policies.remove(id).is_some())
    }

    async fn list(
        &self,
        filter: &PolicyFilter,
        page: PageQuery,
    ) -> Result<Page<RetentionPolicy>, StoreError> {
        let page = page.normalized();

        let mut matching: Vec<RetentionPolicy> = self
            .policies
            .iter()
            .filter(|entry| Self::matches(filter, entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| a.name.cmp(&b.name));

        let total = matching.len() as u64;
        let items: Vec<RetentionPolicy> = matching
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(items, total, page.page, page.page_size))
    }

    async fn get_default(&self) -> Result<Option<RetentionPolicy>, StoreError> {
        Ok(self
            .policies
            .iter()
            .find(|entry| entry.value().is_default)
            .map(|entry| entry.value().clone()))
    }
}
