//! Wire-record listing.

use chairside_core::{Page, WireArch, WireRecord, WireStatus};

use crate::list::FilterSet;
use crate::{ChairsideClient, Error};

/// Query for `GET /v1/wires`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListWiresQuery {
    pub arch: Option<WireArch>,
    pub status: Option<WireStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListWiresQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(arch) = self.arch {
            query.push(("arch", arch.as_str().to_owned()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_owned()));
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

/// Filter set for the wire listing.
///
/// Arch and status go to the server; the patient-name search is applied
/// locally against the fetched page, so typing in the search box never
/// triggers a refetch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WireListFilter {
    pub arch: Option<WireArch>,
    pub status: Option<WireStatus>,
    pub name_search: String,
}

impl WireListFilter {
    /// Rows of the fetched page that pass the local name search.
    #[must_use]
    pub fn visible<'a>(&self, page: &'a Page<WireRecord>) -> Vec<&'a WireRecord> {
        page.items
            .iter()
            .filter(|record| record.matches_name(&self.name_search))
            .collect()
    }
}

impl FilterSet for WireListFilter {
    fn encode(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(arch) = self.arch {
            pairs.push(("arch".to_owned(), arch.as_str().to_owned()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_owned(), status.as_str().to_owned()));
        }
        pairs
    }

    fn decode(pairs: &[(String, String)]) -> Self {
        let mut filter = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "arch" => filter.arch = WireArch::parse(value),
                "status" => filter.status = WireStatus::parse(value),
                _ => {}
            }
        }
        filter
    }
}

impl ChairsideClient {
    /// List wire records, filtered by arch and status.
    pub async fn list_wires(&self, query: &ListWiresQuery) -> Result<Page<WireRecord>, Error> {
        let req = self
            .client
            .get(self.url("/v1/wires"))
            .query(&query.pairs());
        self.execute(req).await
    }
}
