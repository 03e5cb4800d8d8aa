//! Retention policy resource methods.

use serde::{Deserialize, Serialize};

use chairside_core::{ImageCategory, Page, RetentionPolicy};

use crate::{ChairsideClient, Error};

/// Query for `GET /v1/retention/policies`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListPoliciesQuery {
    pub active: Option<bool>,
    pub category: Option<ImageCategory>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListPoliciesQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(active) = self.active {
            query.push(("active", active.to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.as_str().to_owned()));
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

/// One listing row: the policy plus derived display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyListItem {
    pub policy: RetentionPolicy,
    /// Number of images currently assigned to this policy.
    pub image_count: u64,
    /// `true` when the policy has no category restriction.
    pub applies_to_all: bool,
}

/// A page of policy listing rows.
pub type PolicyPage = Page<PolicyListItem>;

/// Request body for `POST /v1/retention/policies`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Empty means the policy applies to all categories.
    pub categories: Vec<ImageCategory>,
    pub retention_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_extension_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_after_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_before_archive_days: Option<u32>,
    pub auto_extend_on_access: bool,
    pub is_default: bool,
}

/// Request body for `PUT /v1/retention/policies/{id}`. Absent fields are
/// left unchanged; a present-but-null optional field clears the value.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<ImageCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_extension_years: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_after_years: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_before_archive_days: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_extend_on_access: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetActiveBody {
    active: bool,
}

impl ChairsideClient {
    /// List retention policies with image counts attached.
    pub async fn list_policies(&self, query: &ListPoliciesQuery) -> Result<PolicyPage, Error> {
        let req = self
            .client
            .get(self.url("/v1/retention/policies"))
            .query(&query.pairs());
        self.execute(req).await
    }

    /// Fetch a single policy.
    pub async fn get_policy(&self, id: &str) -> Result<RetentionPolicy, Error> {
        let req = self
            .client
            .get(self.url(&format!("/v1/retention/policies/{id}")));
        self.execute(req).await
    }

    /// Create a retention policy.
    pub async fn create_policy(
        &self,
        request: &CreatePolicyRequest,
    ) -> Result<RetentionPolicy, Error> {
        let req = self
            .client
            .post(self.url("/v1/retention/policies"))
            .json(request);
        self.execute(req).await
    }

    /// Partially update a retention policy.
    pub async fn update_policy(
        &self,
        id: &str,
        request: &UpdatePolicyRequest,
    ) -> Result<RetentionPolicy, Error> {
        let req = self
            .client
            .put(self.url(&format!("/v1/retention/policies/{id}")))
            .json(request);
        self.execute(req).await
    }

    /// Delete a policy. Fails with `DEFAULT_POLICY` or `POLICY_IN_USE`
    /// when the policy is still referenced.
    pub async fn delete_policy(&self, id: &str) -> Result<(), Error> {
        let req = self
            .client
            .delete(self.url(&format!("/v1/retention/policies/{id}")));
        self.execute_no_data(req).await
    }

    /// Make this policy the single practice default.
    pub async fn set_default_policy(&self, id: &str) -> Result<RetentionPolicy, Error> {
        let req = self
            .client
            .put(self.url(&format!("/v1/retention/policies/{id}/default")));
        self.execute(req).await
    }

    /// Enable or disable a policy.
    pub async fn set_policy_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<RetentionPolicy, Error> {
        let req = self
            .client
            .put(self.url(&format!("/v1/retention/policies/{id}/active")))
            .json(&SetActiveBody { active });
        self.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_absent_from_null() {
        let request = UpdatePolicyRequest {
            retention_years: Some(10),
            archive_after_years: Some(None),
            ..UpdatePolicyRequest::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["retentionYears"], serde_json::json!(10));
        // Present-but-null clears the threshold.
        assert!(json.as_object().unwrap().contains_key("archiveAfterYears"));
        assert!(json["archiveAfterYears"].is_null());
        // Untouched fields are omitted entirely.
        assert!(!json.as_object().unwrap().contains_key("name"));
    }
}
