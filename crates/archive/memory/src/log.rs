use async_trait::async_trait;
use dashmap::DashMap;

use chairside_archive::{ArchiveLog, ArchiveLogError, ArchiveQuery};
use chairside_core::{ArchiveRecord, Page, PageQuery};

/// In-memory archive log using `DashMap`. Suitable for development and
/// testing.
///
/// Records are stored in a concurrent map keyed by record ID, with a
/// secondary index from image ID to record IDs.
pub struct MemoryArchiveLog {
    /// Primary store: record ID -> `ArchiveRecord`.
    records: DashMap<String, ArchiveRecord>,
    /// Secondary index: image ID -> list of record IDs.
    image_index: DashMap<String, Vec<String>>,
}

impl MemoryArchiveLog {
    /// Create a new empty in-memory archive log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            image_index: DashMap::new(),
        }
    }

    fn matches(query: &ArchiveQuery, record: &ArchiveRecord) -> bool {
        if let Some(ref image_id) = query.image_id
            && record.image_id != *image_id
        {
            return false;
        }
        if let Some(action) = query.action
            && record.action != action
        {
            return false;
        }
        if let Some(ref actor) = query.actor
            && record.actor != *actor
        {
            return false;
        }
        if let Some(ref from) = query.from
            && record.occurred_at < *from
        {
            return false;
        }
        if let Some(ref to) = query.to
            && record.occurred_at > *to
        {
            return false;
        }
        true
    }
}

impl Default for MemoryArchiveLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveLog for MemoryArchiveLog {
    async fn append(&self, record: ArchiveRecord) -> Result<(), ArchiveLogError> {
        let id = record.id.clone();
        let image_id = record.image_id.clone();
        self.records.insert(id.clone(), record);
        self.image_index.entry(image_id).or_default().push(id);
        Ok(())
    }

    async fn query(
        &self,
        query: &ArchiveQuery,
        page: PageQuery,
    ) -> Result<Page<ArchiveRecord>, ArchiveLogError> {
        let page = page.normalized();

        let mut matching: Vec<ArchiveRecord> = self
            .records
            .iter()
            .filter(|entry| Self::matches(query, entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first.
        matching.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

        let total = matching.len() as u64;
        let items: Vec<ArchiveRecord> = matching
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(items, total, page.page, page.page_size))
    }

    async fn for_image(&self, image_id: &str) -> Result<Vec<ArchiveRecord>, ArchiveLogError> {
        let Some(ids) = self.image_index.get(image_id) else {
            return Ok(Vec::new());
        };

        let mut records: Vec<ArchiveRecord> = ids
            .value()
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| r.value().clone()))
            .collect();
        records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chairside_core::ArchiveAction;

    fn record(image_id: &str, action: ArchiveAction, actor: &str) -> ArchiveRecord {
        ArchiveRecord::new(image_id, format!("{image_id}.dcm"), action, actor, None)
    }

    #[tokio::test]
    async fn append_and_query_by_image() {
        let log = MemoryArchiveLog::new();
        log.append(record("img_1", ArchiveAction::Archived, "system"))
            .await
            .unwrap();
        log.append(record("img_1", ArchiveAction::Restored, "staff"))
            .await
            .unwrap();
        log.append(record("img_2", ArchiveAction::LegalHoldSet, "dr.wells"))
            .await
            .unwrap();

        let history = log.for_image("img_1").await.unwrap();
        assert_eq!(history.len(), 2);

        let page = log
            .query(
                &ArchiveQuery {
                    action: Some(ArchiveAction::Restored),
                    ..ArchiveQuery::default()
                },
                PageQuery::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].image_id, "img_1");
    }

    #[tokio::test]
    async fn query_paginates_newest_first() {
        let log = MemoryArchiveLog::new();
        for i in 0..5 {
            log.append(record(&format!("img_{i}"), ArchiveAction::Archived, "system"))
                .await
                .unwrap();
        }

        let page = log
            .query(
                &ArchiveQuery::default(),
                PageQuery {
                    page: 1,
                    page_size: 2,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 3);
        assert!(page.items[0].occurred_at >= page.items[1].occurred_at);
    }

    #[tokio::test]
    async fn unknown_image_has_empty_history() {
        let log = MemoryArchiveLog::new();
        assert!(log.for_image("img_404").await.unwrap().is_empty());
    }
}
