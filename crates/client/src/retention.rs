//! Retention dashboard methods: reports, archive history, and the
//! legal-hold table.

use chairside_core::{
    ArchiveAction, ArchiveRecord, ComplianceReport, Image, Page, StorageReport,
};

use crate::{ChairsideClient, Error};

/// Query for `GET /v1/retention/archive`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArchiveHistoryQuery {
    pub image_id: Option<String>,
    pub action: Option<ArchiveAction>,
    pub actor: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ArchiveHistoryQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(id) = &self.image_id {
            query.push(("imageId", id.clone()));
        }
        if let Some(action) = self.action {
            query.push(("action", action.as_str().to_owned()));
        }
        if let Some(actor) = &self.actor {
            query.push(("actor", actor.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            query.push(("pageSize", size.to_string()));
        }
        query
    }
}

impl ChairsideClient {
    /// The compliance gauge numbers.
    pub async fn retention_report(&self) -> Result<ComplianceReport, Error> {
        let req = self.client.get(self.url("/v1/retention/report"));
        self.execute(req).await
    }

    /// Hot/cold storage split and per-category breakdown.
    pub async fn storage_report(&self) -> Result<StorageReport, Error> {
        let req = self.client.get(self.url("/v1/retention/storage"));
        self.execute(req).await
    }

    /// Paginated archive history across all images.
    pub async fn archive_history(
        &self,
        query: &ArchiveHistoryQuery,
    ) -> Result<Page<ArchiveRecord>, Error> {
        let req = self
            .client
            .get(self.url("/v1/retention/archive"))
            .query(&query.pairs());
        self.execute(req).await
    }

    /// Images currently under legal hold.
    pub async fn legal_holds(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Page<Image>, Error> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(page) = page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = page_size {
            pairs.push(("pageSize", size.to_string()));
        }
        let req = self
            .client
            .get(self.url("/v1/retention/legal-holds"))
            .query(&pairs);
        self.execute(req).await
    }
}
