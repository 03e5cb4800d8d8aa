use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use chairside_archive_memory::MemoryArchiveLog;
use chairside_server::api::{AppState, router};
use chairside_server::session::StaticSessionValidator;
use chairside_store_memory::{MemoryImageStore, MemoryPolicyStore, MemoryWireStore};

// -- Helpers --------------------------------------------------------------

const SESSION: &str = "portal_session=tok-1";

fn build_state() -> AppState {
    AppState {
        images: Arc::new(MemoryImageStore::new()),
        policies: Arc::new(MemoryPolicyStore::new()),
        wires: Arc::new(MemoryWireStore::new()),
        archive: Arc::new(MemoryArchiveLog::new()),
        sessions: Arc::new(
            StaticSessionValidator::new().with_token("tok-1", "dr.wells", "Dr. Wells"),
        ),
    }
}

fn build_app(state: AppState) -> axum::Router {
    router(state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, SESSION);
    let request = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(value.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn policy_body(name: &str) -> Value {
    json!({
        "name": name,
        "retentionYears": 7,
        "archiveAfterYears": 5,
        "notifyBeforeArchiveDays": 60,
    })
}

async fn create_policy(app: &axum::Router, name: &str) -> Value {
    let (status, body) = send(app, "POST", "/v1/retention/policies", Some(policy_body(name))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

async fn create_image(app: &axum::Router, file_name: &str, category: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/v1/images",
        Some(json!({
            "fileName": file_name,
            "category": category,
            "capturedAt": "2024-03-01T10:00:00Z",
            "sizeBytes": 2048,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

// -- Session boundary -----------------------------------------------------

#[tokio::test]
async fn health_needs_no_session() {
    let app = build_app(build_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_cookie_yields_no_session_envelope() {
    let app = build_app(build_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/images")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("NO_SESSION"));
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let app = build_app(build_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/images")
                .header(header::COOKIE, "portal_session=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// -- Policy CRUD ----------------------------------------------------------

#[tokio::test]
async fn create_policy_with_no_categories_applies_to_all() {
    let app = build_app(build_state());
    let policy = create_policy(&app, "Standard 7-Year").await;
    assert_eq!(policy["name"], json!("Standard 7-Year"));

    let (status, body) = send(&app, "GET", "/v1/retention/policies", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["appliesToAll"], json!(true));
    assert_eq!(items[0]["imageCount"], json!(0));
}

#[tokio::test]
async fn duplicate_policy_name_conflicts() {
    let app = build_app(build_state());
    create_policy(&app, "Standard 7-Year").await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/retention/policies",
        Some(policy_body("standard 7-year")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("DUPLICATE_NAME"));
}

#[tokio::test]
async fn renaming_policy_to_existing_name_conflicts() {
    let app = build_app(build_state());
    create_policy(&app, "Standard 7-Year").await;
    let other = create_policy(&app, "CBCT 10-Year").await;
    let id = other["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/v1/retention/policies/{id}"),
        Some(json!({"name": "standard 7-year"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("DUPLICATE_NAME"));

    // Re-casing a policy's own name is not a conflict.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/v1/retention/policies/{id}"),
        Some(json!({"name": "CBCT 10-year"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("CBCT 10-year"));
}

#[tokio::test]
async fn archive_threshold_invariant_rejected_before_any_write() {
    let app = build_app(build_state());
    let (status, body) = send(
        &app,
        "POST",
        "/v1/retention/policies",
        Some(json!({
            "name": "Broken",
            "retentionYears": 7,
            "archiveAfterYears": 7,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    let fields = body["error"]["fields"].as_array().unwrap();
    assert_eq!(fields[0]["field"], json!("archiveAfterYears"));

    // Nothing was persisted.
    let (_, body) = send(&app, "GET", "/v1/retention/policies", None).await;
    assert_eq!(body["data"]["total"], json!(0));
}

#[tokio::test]
async fn toggling_active_twice_restores_original() {
    let app = build_app(build_state());
    let policy = create_policy(&app, "Standard 7-Year").await;
    let id = policy["id"].as_str().unwrap();
    assert_eq!(policy["active"], json!(true));

    let uri = format!("/v1/retention/policies/{id}/active");
    let (status, body) = send(&app, "PUT", &uri, Some(json!({"active": false}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], json!(false));

    let (_, body) = send(&app, "PUT", &uri, Some(json!({"active": true}))).await;
    assert_eq!(body["data"]["active"], json!(true));
}

#[tokio::test]
async fn single_default_policy_is_enforced() {
    let app = build_app(build_state());
    let first = create_policy(&app, "First").await;
    let second = create_policy(&app, "Second").await;
    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();

    send(
        &app,
        "PUT",
        &format!("/v1/retention/policies/{first_id}/default"),
        None,
    )
    .await;
    let (_, body) = send(
        &app,
        "PUT",
        &format!("/v1/retention/policies/{second_id}/default"),
        None,
    )
    .await;
    assert_eq!(body["data"]["isDefault"], json!(true));

    // The previous default lost the flag.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/v1/retention/policies/{first_id}"),
        None,
    )
    .await;
    assert_eq!(body["data"]["isDefault"], json!(false));
}

#[tokio::test]
async fn default_policy_cannot_be_deleted() {
    let app = build_app(build_state());
    let policy = create_policy(&app, "Default").await;
    let id = policy["id"].as_str().unwrap();
    send(
        &app,
        "PUT",
        &format!("/v1/retention/policies/{id}/default"),
        None,
    )
    .await;

    let (status, body) = send(&app, "DELETE", &format!("/v1/retention/policies/{id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("DEFAULT_POLICY"));
}

#[tokio::test]
async fn referenced_policy_cannot_be_deleted() {
    let app = build_app(build_state());
    let policy = create_policy(&app, "Standard 7-Year").await;
    let policy_id = policy["id"].as_str().unwrap();

    let image = create_image(&app, "pan-001.dcm", "panoramic_xray").await;
    let image_id = image["id"].as_str().unwrap();
    send(
        &app,
        "PUT",
        &format!("/v1/images/{image_id}/policy"),
        Some(json!({"policyId": policy_id})),
    )
    .await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/v1/retention/policies/{policy_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("POLICY_IN_USE"));
}

// -- Images & retention lifecycle ----------------------------------------

#[tokio::test]
async fn create_image_auto_assigns_applicable_default() {
    let app = build_app(build_state());
    let policy = create_policy(&app, "Default").await;
    let id = policy["id"].as_str().unwrap();
    send(
        &app,
        "PUT",
        &format!("/v1/retention/policies/{id}/default"),
        None,
    )
    .await;

    let image = create_image(&app, "pan-001.dcm", "panoramic_xray").await;
    assert_eq!(image["policyId"], json!(id));
    assert_eq!(image["storageTier"], json!("hot"));
}

#[tokio::test]
async fn archive_then_restore_round_trip() {
    let app = build_app(build_state());
    let image = create_image(&app, "pan-001.dcm", "panoramic_xray").await;
    let id = image["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/images/{id}/archive"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["storageTier"], json!("cold"));

    // The archived image shows up under the cold-tier filter.
    let (_, body) = send(&app, "GET", "/v1/images?storageTier=cold", None).await;
    assert_eq!(body["data"]["total"], json!(1));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/images/{id}/restore"),
        Some(json!({"reason": "Patient requested copies"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["storageTier"], json!("hot"));

    // ...and leaves the archived view on the next fetch.
    let (_, body) = send(&app, "GET", "/v1/images?storageTier=cold", None).await;
    assert_eq!(body["data"]["total"], json!(0));

    // Exactly one RESTORED record with the supplied reason.
    let (_, body) = send(&app, "GET", &format!("/v1/images/{id}/history"), None).await;
    let records = body["data"].as_array().unwrap();
    let restored: Vec<&Value> = records
        .iter()
        .filter(|r| r["action"] == json!("RESTORED"))
        .collect();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0]["reason"], json!("Patient requested copies"));
    assert_eq!(restored[0]["actor"], json!("dr.wells"));
}

#[tokio::test]
async fn audit_append_failure_surfaces_as_server_error() {
    use async_trait::async_trait;
    use chairside_archive::{ArchiveLog, ArchiveLogError, ArchiveQuery};
    use chairside_core::{ArchiveRecord, Page, PageQuery};

    struct UnwritableArchiveLog;

    #[async_trait]
    impl ArchiveLog for UnwritableArchiveLog {
        async fn append(&self, _record: ArchiveRecord) -> Result<(), ArchiveLogError> {
            Err(ArchiveLogError::Storage("log volume offline".into()))
        }

        async fn query(
            &self,
            _query: &ArchiveQuery,
            _page: PageQuery,
        ) -> Result<Page<ArchiveRecord>, ArchiveLogError> {
            Err(ArchiveLogError::Storage("log volume offline".into()))
        }

        async fn for_image(
            &self,
            _image_id: &str,
        ) -> Result<Vec<ArchiveRecord>, ArchiveLogError> {
            Err(ArchiveLogError::Storage("log volume offline".into()))
        }
    }

    let state = AppState {
        archive: Arc::new(UnwritableArchiveLog),
        ..build_state()
    };
    let app = build_app(state);

    let image = create_image(&app, "a.dcm", "cbct").await;
    let id = image["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/images/{id}/archive"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], json!("SERVER_ERROR"));

    // The tier change was persisted before the history append failed.
    let (_, body) = send(&app, "GET", &format!("/v1/images/{id}"), None).await;
    assert_eq!(body["data"]["image"]["storageTier"], json!("cold"));
}

#[tokio::test]
async fn legal_hold_blocks_archive_and_delete_until_removed() {
    let app = build_app(build_state());
    let image = create_image(&app, "img_123.dcm", "cbct").await;
    let id = image["id"].as_str().unwrap();

    // Reason is mandatory.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/images/{id}/legal-hold"),
        Some(json!({"reason": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/images/{id}/legal-hold"),
        Some(json!({"reason": "Pending litigation"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["legalHold"]["setBy"], json!("dr.wells"));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/images/{id}/archive"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("LEGAL_HOLD_ACTIVE"));

    let (status, _) = send(&app, "DELETE", &format!("/v1/images/{id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/v1/images/{id}/legal-hold"),
        Some(json!({"reason": "Case dismissed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Archival eligibility is back.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/images/{id}/archive"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn list_pagination_math_holds() {
    let app = build_app(build_state());
    for i in 0..5 {
        create_image(&app, &format!("img-{i}.jpg"), "intraoral_photo").await;
    }

    let (status, body) = send(&app, "GET", "/v1/images?page=1&pageSize=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total"], json!(5));
    assert_eq!(data["totalPages"], json!(3));
    assert!(data["items"].as_array().unwrap().len() <= 2);

    let (_, body) = send(&app, "GET", "/v1/images?page=3&pageSize=2", None).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn category_filter_narrows_listing() {
    let app = build_app(build_state());
    create_image(&app, "a.dcm", "cbct").await;
    create_image(&app, "b.jpg", "intraoral_photo").await;

    let (_, body) = send(&app, "GET", "/v1/images?category=cbct", None).await;
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(
        body["data"]["items"][0]["image"]["category"],
        json!("cbct")
    );
}

// -- Dashboard projections -------------------------------------------------

#[tokio::test]
async fn compliance_report_excludes_archived_from_needs_policy() {
    let app = build_app(build_state());
    let policy = create_policy(&app, "Default").await;
    let id = policy["id"].as_str().unwrap();
    send(
        &app,
        "PUT",
        &format!("/v1/retention/policies/{id}/default"),
        None,
    )
    .await;

    // Two covered images, one uncovered, one archived-without-policy.
    create_image(&app, "a.dcm", "panoramic_xray").await;
    create_image(&app, "b.dcm", "cbct").await;

    // Drop the default so the next image lands without a policy.
    send(
        &app,
        "PUT",
        &format!("/v1/retention/policies/{id}/active"),
        Some(json!({"active": false})),
    )
    .await;
    // Deactivating doesn't clear the default flag, but create_image only
    // auto-assigns active defaults.
    let orphan = create_image(&app, "c.dcm", "cbct").await;
    let archived = create_image(&app, "d.dcm", "cbct").await;
    let _ = orphan;
    let archived_id = archived["id"].as_str().unwrap();
    send(
        &app,
        "POST",
        &format!("/v1/images/{archived_id}/archive"),
        Some(json!({})),
    )
    .await;

    let (status, body) = send(&app, "GET", "/v1/retention/report", None).await;
    assert_eq!(status, StatusCode::OK);
    let report = &body["data"];
    assert_eq!(report["totalImages"], json!(4));
    assert_eq!(report["withPolicy"], json!(2));
    assert_eq!(report["needsPolicy"], json!(1));
    assert_eq!(report["archived"], json!(1));
    assert_eq!(report["complianceRate"], json!(50.0));
}

#[tokio::test]
async fn storage_report_splits_hot_and_cold() {
    let app = build_app(build_state());
    let a = create_image(&app, "a.dcm", "cbct").await;
    create_image(&app, "b.dcm", "cbct").await;
    let id = a["id"].as_str().unwrap();
    send(
        &app,
        "POST",
        &format!("/v1/images/{id}/archive"),
        Some(json!({})),
    )
    .await;

    let (_, body) = send(&app, "GET", "/v1/retention/storage", None).await;
    let report = &body["data"];
    assert_eq!(report["totalBytes"], json!(4096));
    assert_eq!(report["hotBytes"], json!(2048));
    assert_eq!(report["coldBytes"], json!(2048));
    assert_eq!(report["hotPercent"], json!(50.0));
}

#[tokio::test]
async fn legal_hold_table_projects_held_images() {
    let app = build_app(build_state());
    let image = create_image(&app, "a.dcm", "cbct").await;
    let id = image["id"].as_str().unwrap();
    create_image(&app, "b.dcm", "cbct").await;

    send(
        &app,
        "POST",
        &format!("/v1/images/{id}/legal-hold"),
        Some(json!({"reason": "Pending litigation"})),
    )
    .await;

    let (_, body) = send(&app, "GET", "/v1/retention/legal-holds", None).await;
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["items"][0]["id"], json!(id));
}

#[tokio::test]
async fn archive_history_filters_by_action() {
    let app = build_app(build_state());
    let image = create_image(&app, "a.dcm", "cbct").await;
    let id = image["id"].as_str().unwrap();
    send(
        &app,
        "POST",
        &format!("/v1/images/{id}/archive"),
        Some(json!({})),
    )
    .await;
    send(
        &app,
        "POST",
        &format!("/v1/images/{id}/restore"),
        Some(json!({})),
    )
    .await;

    let (_, body) = send(&app, "GET", "/v1/retention/archive?action=ARCHIVED", None).await;
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["items"][0]["action"], json!("ARCHIVED"));
}

// -- Wires ----------------------------------------------------------------

#[tokio::test]
async fn wires_filter_by_status_server_side() {
    let state = build_state();
    let app = build_app(state.clone());

    // Insert directly through the store; there is no wire mutation API.
    use chairside_core::{WireArch, WireRecord, WireStatus};
    use chairside_store::WireStore;
    let records = [
        ("w1", "Okonkwo", WireStatus::Active),
        ("w2", "Silva", WireStatus::Removed),
    ];
    for (id, last, status) in records {
        state
            .wires
            .insert(WireRecord {
                id: id.into(),
                patient_first_name: "Pat".into(),
                patient_last_name: last.into(),
                arch: WireArch::Upper,
                wire: "016 NiTi".into(),
                sequence: 1,
                status,
                placed_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
    }

    let (status, body) = send(&app, "GET", "/v1/wires?status=active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(
        body["data"]["items"][0]["patientLastName"],
        json!("Okonkwo")
    );
}
