//! Image resource methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chairside_core::{
    ArchiveRecord, Image, ImageCategory, Page, RetentionStatus, StorageTier,
};

use crate::{ChairsideClient, Error};

/// Query for `GET /v1/images`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListImagesQuery {
    pub category: Option<ImageCategory>,
    pub storage_tier: Option<StorageTier>,
    pub legal_hold: Option<bool>,
    pub policy_id: Option<String>,
    pub has_policy: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListImagesQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(category) = self.category {
            query.push(("category", category.as_str().to_owned()));
        }
        if let Some(tier) = self.storage_tier {
            query.push(("storageTier", tier.as_str().to_owned()));
        }
        if let Some(hold) = self.legal_hold {
            query.push(("legalHold", hold.to_string()));
        }
        if let Some(id) = &self.policy_id {
            query.push(("policyId", id.clone()));
        }
        if let Some(has) = self.has_policy {
            query.push(("hasPolicy", has.to_string()));
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

/// One listing row: the stored image plus its computed retention status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageListItem {
    pub image: Image,
    pub retention: RetentionStatus,
}

/// A page of image listing rows.
pub type ImagePage = Page<ImageListItem>;

/// Request body for `POST /v1/images`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub file_name: String,
    pub category: ImageCategory,
    pub captured_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub patient_minor: bool,
    /// Explicit policy assignment; leave `None` to pick up the
    /// applicable default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReasonBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignPolicyBody<'a> {
    policy_id: Option<&'a str>,
}

impl ChairsideClient {
    /// List images with the computed retention status attached to each
    /// row.
    pub async fn list_images(&self, query: &ListImagesQuery) -> Result<ImagePage, Error> {
        let req = self
            .client
            .get(self.url("/v1/images"))
            .query(&query.pairs());
        self.execute(req).await
    }

    /// Fetch a single image and its retention status.
    pub async fn get_image(&self, id: &str) -> Result<ImageListItem, Error> {
        let req = self.client.get(self.url(&format!("/v1/images/{id}")));
        self.execute(req).await
    }

    /// Register a captured image.
    pub async fn create_image(&self, request: &CreateImageRequest) -> Result<Image, Error> {
        let req = self.client.post(self.url("/v1/images")).json(request);
        self.execute(req).await
    }

    /// Delete an image. Fails with `LEGAL_HOLD_ACTIVE` while a hold is
    /// in place.
    pub async fn delete_image(&self, id: &str) -> Result<(), Error> {
        let req = self.client.delete(self.url(&format!("/v1/images/{id}")));
        self.execute_no_data(req).await
    }

    /// Assign a retention policy, or clear the assignment with `None`.
    pub async fn assign_policy(
        &self,
        id: &str,
        policy_id: Option<&str>,
    ) -> Result<Image, Error> {
        let req = self
            .client
            .put(self.url(&format!("/v1/images/{id}/policy")))
            .json(&AssignPolicyBody { policy_id });
        self.execute(req).await
    }

    /// Move an image to cold storage.
    pub async fn archive_image(&self, id: &str, reason: Option<&str>) -> Result<Image, Error> {
        let req = self
            .client
            .post(self.url(&format!("/v1/images/{id}/archive")))
            .json(&ReasonBody { reason });
        self.execute(req).await
    }

    /// Bring an archived image back to hot storage.
    pub async fn restore_image(&self, id: &str, reason: Option<&str>) -> Result<Image, Error> {
        let req = self
            .client
            .post(self.url(&format!("/v1/images/{id}/restore")))
            .json(&ReasonBody { reason });
        self.execute(req).await
    }

    /// Place a legal hold. The reason is mandatory.
    pub async fn set_legal_hold(&self, id: &str, reason: &str) -> Result<Image, Error> {
        let req = self
            .client
            .post(self.url(&format!("/v1/images/{id}/legal-hold")))
            .json(&ReasonBody {
                reason: Some(reason),
            });
        self.execute(req).await
    }

    /// Lift a legal hold.
    pub async fn remove_legal_hold(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<Image, Error> {
        let req = self
            .client
            .delete(self.url(&format!("/v1/images/{id}/legal-hold")))
            .json(&ReasonBody { reason });
        self.execute(req).await
    }

    /// Record that the image was viewed; extends retention under
    /// auto-extend policies.
    pub async fn record_access(&self, id: &str) -> Result<Image, Error> {
        let req = self
            .client
            .post(self.url(&format!("/v1/images/{id}/access")));
        self.execute(req).await
    }

    /// Full archive history for one image, newest first.
    pub async fn image_history(&self, id: &str) -> Result<Vec<ArchiveRecord>, Error> {
        let req = self
            .client
            .get(self.url(&format!("/v1/images/{id}/history")));
        self.execute(req).await
    }
}
