use async_trait::async_trait;
use dashmap::DashMap;

use chairside_core::{Page, PageQuery, WireRecord};
use chairside_store::{StoreError, WireFilter, WireStore};

/// In-memory [`WireStore`] backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryWireStore {
    records: DashMap<String, WireRecord>,
}

impl MemoryWireStore {
    /// Create a new, empty in-memory wire store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(filter: &WireFilter, record: &WireRecord) -> bool {
        if let Some(arch) = filter.arch
            && record.arch != arch
        {
            return false;
        }
        if let Some(status) = filter.status
            && record.status != status
        {
            return false;
        }
        true
    }
}

#[async_trait]
impl WireStore for MemoryWireStore {
    async fn insert(&self, record: WireRecord) -> Result<(), StoreError> {
        match self.records.entry(record.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "wire record {} already exists",
                record.id
            ))),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<WireRecord>, StoreError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn list(
        &self,
        filter: &WireFilter,
        page: PageQuery,
    ) -> Result<Page<WireRecord>, StoreError> {
        let page = page.normalized();

        let mut matching: Vec<WireRecord> = self
            .records
            .iter()
            .filter(|entry| Self::matches(filter, entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));

        let total = matching.len() as u64;
        let items: Vec<WireRecord> = matching
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(items, total, page.page, page.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chairside_core::{WireArch, WireStatus};
    use chrono::Utc;

    fn wire(id: &str, last: &str, arch: WireArch, status: WireStatus) -> WireRecord {
        WireRecord {
            id: id.into(),
            patient_first_name: "Pat".into(),
            patient_last_name: last.into(),
            arch,
            wire: "016 NiTi".into(),
            sequence: 1,
            status,
            placed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_filters_by_arch_and_status() {
        let store = MemoryWireStore::new();
        store
            .insert(wire("w1", "Okonkwo", WireArch::Upper, WireStatus::Active))
            .await
            .unwrap();
        store
            .insert(wire("w2", "Okonkwo", WireArch::Lower, WireStatus::Active))
            .await
            .unwrap();
        store
            .insert(wire("w3", "Silva", WireArch::Upper, WireStatus::Removed))
            .await
            .unwrap();

        let page = store
            .list(
                &WireFilter {
                    arch: Some(WireArch::Upper),
                    status: Some(WireStatus::Active),
                },
                PageQuery::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "w1");
    }
}
