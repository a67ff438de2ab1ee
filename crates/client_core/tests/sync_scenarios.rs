use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use client_core::{FormMode, OperationContext, SyncError, SyncOrchestrator};
use serde_json::{json, Value};
use shared::domain::{UserField, UserId};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct Backend {
    users: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<Mutex<i64>>,
    fail_writes: Arc<Mutex<bool>>,
}

async fn list_users(State(backend): State<Backend>) -> Json<Vec<Value>> {
    Json(backend.users.lock().await.clone())
}

async fn create_user(
    State(backend): State<Backend>,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    if *backend.fail_writes.lock().await {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let mut next_id = backend.next_id.lock().await;
    body["id"] = json!(*next_id);
    *next_id += 1;
    backend.users.lock().await.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_user(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if *backend.fail_writes.lock().await {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let mut users = backend.users.lock().await;
    let existing = users
        .iter_mut()
        .find(|user| user["id"] == json!(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    body["id"] = json!(id);
    *existing = body.clone();
    Ok(Json(body))
}

async fn delete_user(State(backend): State<Backend>, Path(id): Path<i64>) -> StatusCode {
    backend.users.lock().await.retain(|user| user["id"] != json!(id));
    StatusCode::OK
}

async fn placeholder_users() -> Json<Value> {
    Json(json!([
        {
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {"name": "Romaguera-Crona"}
        }
    ]))
}

async fn unavailable() -> StatusCode {
    StatusCode::BAD_GATEWAY
}

async fn spawn_backend(initial: Vec<Value>) -> Result<(String, Backend)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let backend = Backend {
        next_id: Arc::new(Mutex::new(initial.len() as i64 + 1)),
        users: Arc::new(Mutex::new(initial)),
        fail_writes: Arc::new(Mutex::new(false)),
    };
    let app = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/placeholder/users", get(placeholder_users))
        .route("/down/users", get(unavailable))
        .with_state(backend.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), backend))
}

#[tokio::test]
async fn edit_round_trip_over_http() {
    let (url, backend) = spawn_backend(vec![json!({
        "id": 1,
        "name": "Ann",
        "email": "a@x.com",
        "phone": "1",
        "website": "a.com"
    })])
    .await
    .expect("spawn backend");
    let sync = SyncOrchestrator::from_urls(
        &format!("{url}/users"),
        &format!("{url}/placeholder/users"),
    )
    .expect("orchestrator");

    sync.initialize().await;
    let loaded = sync.snapshot().await;
    assert!(!loaded.is_loading);
    assert_eq!(loaded.read_only_records[0].name, "Leanne Graham");
    assert_eq!(loaded.read_only_records[0].website_url(), "http://hildegard.org");

    let ann = loaded.primary_records[0].clone();
    sync.start_edit(&ann).await;
    sync.update_field(UserField::Name, "Annie").await;
    sync.submit().await.expect("update");

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.primary_records.len(), 1);
    assert_eq!(snapshot.primary_records[0].id, UserId::from(1));
    assert_eq!(snapshot.primary_records[0].name, "Annie");
    assert_eq!(snapshot.form_mode, FormMode::Create);
    assert!(snapshot.draft.is_empty());
    assert_eq!(backend.users.lock().await[0]["name"], "Annie");
}

#[tokio::test]
async fn create_then_delete_over_http() {
    let (url, backend) = spawn_backend(Vec::new()).await.expect("spawn backend");
    let sync = SyncOrchestrator::from_urls(
        &format!("{url}/users"),
        &format!("{url}/placeholder/users"),
    )
    .expect("orchestrator");
    sync.initialize().await;
    assert!(sync.snapshot().await.primary_is_empty());

    sync.update_field(UserField::Name, "Bob").await;
    sync.update_field(UserField::Email, "bob@x.com").await;
    sync.update_field(UserField::Phone, "2").await;
    sync.update_field(UserField::Website, "http://bob.dev").await;
    sync.submit().await.expect("create");

    let created = sync.snapshot().await.primary_records[0].clone();
    assert_eq!(created.id, UserId::from(1));
    assert_eq!(created.website, "bob.dev");

    sync.delete_record(&created.id).await.expect("delete");
    assert!(sync.snapshot().await.primary_is_empty());
    assert!(backend.users.lock().await.is_empty());
}

#[tokio::test]
async fn failed_create_over_http_keeps_draft() {
    let (url, backend) = spawn_backend(Vec::new()).await.expect("spawn backend");
    let sync = SyncOrchestrator::from_urls(
        &format!("{url}/users"),
        &format!("{url}/placeholder/users"),
    )
    .expect("orchestrator");
    sync.initialize().await;
    sync.update_field(UserField::Name, "Bob").await;
    *backend.fail_writes.lock().await = true;

    let err = sync.submit().await.expect_err("create must fail");

    let snapshot = sync.snapshot().await;
    assert_eq!(err.context(), OperationContext::Create);
    assert_eq!(
        snapshot.current_error.as_ref().map(SyncError::context),
        Some(OperationContext::Create)
    );
    assert!(snapshot.primary_is_empty());
    assert_eq!(snapshot.draft.name, "Bob");
    assert_eq!(snapshot.form_mode, FormMode::Create);
}

#[tokio::test]
async fn both_sources_down_finishes_loading_with_primary_error() {
    let (url, _backend) = spawn_backend(Vec::new()).await.expect("spawn backend");
    let sync = SyncOrchestrator::from_urls(
        &format!("{url}/down/users"),
        &format!("{url}/down/users"),
    )
    .expect("orchestrator");

    sync.initialize().await;

    let snapshot = sync.snapshot().await;
    assert!(!snapshot.is_loading);
    let err = snapshot.current_error.expect("error surfaced");
    assert_eq!(err.context(), OperationContext::ListPrimary);
    assert_eq!(
        err.user_message(),
        "Failed to load local users. Please try again later."
    );
}
