//! Chairside HTTP Client
//!
//! A native Rust client for the Chairside records API, plus the two
//! reusable presentation controllers that sit on top of it: a filtered,
//! paginated list controller and a validating mutation form.
//!
//! # Quick Start
//!
//! ```no_run
//! use chairside_client::ChairsideClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chairside_client::Error> {
//!     let client = ChairsideClient::builder("http://localhost:8080")
//!         .session_token("tok-1")
//!         .build()?;
//!
//!     let page = client.list_images(&Default::default()).await?;
//!     for item in &page.items {
//!         println!("{} ({:?})", item.image.file_name, item.retention.state);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Every response arrives in a `{success, data}` envelope; the client
//! unwraps it and surfaces error envelopes as [`Error::Api`]. A missing
//! or expired session becomes [`Error::NoSession`] so callers can route
//! to sign-in.

mod error;
pub mod form;
mod images;
pub mod list;
mod policies;
mod retention;
mod wires;

pub use error::Error;
pub use form::{FormModel, FormOutcome, FormState, PolicyForm};
pub use images::{CreateImageRequest, ImageListItem, ImagePage, ListImagesQuery};
pub use list::{FilterSet, FetchTicket, ListController, ListPhase};
pub use policies::{
    CreatePolicyRequest, ListPoliciesQuery, PolicyListItem, PolicyPage, UpdatePolicyRequest,
};
pub use retention::ArchiveHistoryQuery;
pub use wires::{ListWiresQuery, WireListFilter};

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use chairside_core::FieldError;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of the session cookie the portal issues.
const SESSION_COOKIE: &str = "portal_session";

/// HTTP client for the Chairside records API.
#[derive(Debug, Clone)]
pub struct ChairsideClient {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

/// Builder for configuring a [`ChairsideClient`].
#[derive(Debug)]
pub struct ChairsideClientBuilder {
    base_url: String,
    timeout: Duration,
    session_token: Option<String>,
    client: Option<Client>,
}

impl ChairsideClientBuilder {
    /// Create a new builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            session_token: None,
            client: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the session token sent as the `portal_session` cookie.
    #[must_use]
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Use a custom reqwest Client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ChairsideClient, Error> {
        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };

        Ok(ChairsideClient {
            client,
            base_url: self.base_url,
            session_token: self.session_token,
        })
    }
}

/// Wire shape of every API response. Missing `data`/`error` keys
/// deserialize as `None`; `#[serde(default)]` would drag a `T: Default`
/// bound into the derived impl.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    fields: Vec<FieldError>,
}

impl ChairsideClient {
    /// Create a builder for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> ChairsideClientBuilder {
        ChairsideClientBuilder::new(base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Swap the session token, e.g. after re-authentication.
    pub fn set_session_token(&mut self, token: impl Into<String>) {
        self.session_token = Some(token.into());
    }

    /// Check if the server is healthy. The only call that needs no
    /// session.
    pub async fn health(&self) -> Result<bool, Error> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(response.status().is_success())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the session cookie, when one is configured.
    pub(crate) fn add_session(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_token {
            Some(token) => req.header(
                reqwest::header::COOKIE,
                format!("{SESSION_COOKIE}={token}"),
            ),
            None => req,
        }
    }

    /// Send the request and parse the `{success, data}` envelope.
    ///
    /// A 401 without a parseable envelope becomes [`Error::NoSession`];
    /// any other unparseable body is reported as a generic server error
    /// rather than leaking transport details to the UI layer.
    async fn send_envelope<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, Error> {
        let response = self
            .add_session(req)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if status == reqwest::StatusCode::UNAUTHORIZED => Err(Error::NoSession),
            Err(_) => Err(Error::Api {
                code: "SERVER_ERROR".to_owned(),
                message: "An unexpected error occurred".to_owned(),
                fields: Vec::new(),
            }),
        }
    }

    fn envelope_error(error: Option<ErrorBody>) -> Error {
        let Some(error) = error else {
            return Error::Deserialization("error envelope carried no error body".to_owned());
        };
        if error.code == "NO_SESSION" {
            return Error::NoSession;
        }
        Error::Api {
            code: error.code,
            message: error.message,
            fields: error.fields,
        }
    }

    /// Send the request and unwrap the envelope's `data` payload.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let envelope = self.send_envelope(req).await?;
        if envelope.success {
            envelope.data.ok_or_else(|| {
                Error::Deserialization("success envelope carried no data".to_owned())
            })
        } else {
            Err(Self::envelope_error(envelope.error))
        }
    }

    /// Like [`execute`](Self::execute), for endpoints whose success
    /// envelope carries `data: null`.
    pub(crate) async fn execute_no_data(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<(), Error> {
        let envelope: Envelope<serde_json::Value> = self.send_envelope(req).await?;
        if envelope.success {
            Ok(())
        } else {
            Err(Self::envelope_error(envelope.error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trims_trailing_slash() {
        let client = ChairsideClient::builder("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn envelope_decodes_payloads_without_a_default_impl() {
        // Deliberately no `Default` derive; the envelope must not
        // require one of its payload type.
        #[derive(Debug, Deserialize)]
        struct Payload {
            id: String,
        }

        let success: Envelope<Payload> =
            serde_json::from_str(r#"{"success": true, "data": {"id": "img_1"}}"#).unwrap();
        assert!(success.success);
        assert_eq!(success.data.unwrap().id, "img_1");
        assert!(success.error.is_none());

        // Error envelopes carry no `data` key at all.
        let failure: Envelope<Payload> = serde_json::from_str(
            r#"{"success": false, "error": {"code": "NOT_FOUND", "message": "image img_2 not found"}}"#,
        )
        .unwrap();
        assert!(failure.data.is_none());
        assert_eq!(failure.error.unwrap().code, "NOT_FOUND");
    }

    #[test]
    fn error_envelope_decodes_field_errors() {
        let body = r#"{
            "success": false,
            "error": {
                "code": "VALIDATION_ERROR",
                "message": "Validation failed",
                "fields": [{"field": "retentionYears", "message": "out of range"}]
            }
        }"#;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(!envelope.success);
        let error = envelope.error.unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert_eq!(error.fields.len(), 1);
        assert_eq!(error.fields[0].field, "retentionYears");
    }
}
