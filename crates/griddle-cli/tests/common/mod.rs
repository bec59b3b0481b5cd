// In-process asset server for CLI tests
//
// Runs on its own thread and runtime so tests can block on the griddle binary.
// Mirrors the real API closely enough for the client: `{"detail": ...}`
// errors, naive timestamps, bearer-protected transfers, three versions embedded
// in asset info and listings paged by `offset`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use bytes::Bytes;
use griddle_remote::{next_semver, LISTING_PAGE_SIZE};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const USERNAME: &str = "jdoe";
pub const PASSWORD: &str = "secret";
const TOKEN: &str = "cli-test-token";

struct StoredVersion {
    semver: String,
    message: String,
    archive: Bytes,
}

struct StoredAsset {
    name: String,
    keywords: String,
    /// Most recent first
    versions: Vec<StoredVersion>,
}

#[derive(Clone, Default)]
struct ServerState {
    assets: Arc<Mutex<HashMap<Uuid, StoredAsset>>>,
    uploads: Arc<AtomicUsize>,
}

pub struct FakeServer {
    pub url: String,
    state: ServerState,
}

impl FakeServer {
    pub fn start() -> Self {
        let state = ServerState::default();
        let app = router(state.clone());
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        let addr = rx.recv().unwrap();
        FakeServer {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn add_asset(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.assets.lock().unwrap().insert(
            id,
            StoredAsset {
                name: name.to_string(),
                keywords: String::new(),
                versions: Vec::new(),
            },
        );
        id
    }

    /// Seed a version; it becomes the latest
    pub fn add_version(&self, id: Uuid, semver: &str, archive: Vec<u8>) {
        let mut assets = self.state.assets.lock().unwrap();
        let asset = assets.get_mut(&id).unwrap();
        asset.versions.insert(
            0,
            StoredVersion {
                semver: semver.to_string(),
                message: format!("version {}", semver),
                archive: Bytes::from(archive),
            },
        );
    }

    pub fn upload_count(&self) -> usize {
        self.state.uploads.load(Ordering::SeqCst)
    }

    pub fn latest_semver(&self, id: Uuid) -> Option<String> {
        let assets = self.state.assets.lock().unwrap();
        assets.get(&id)?.versions.first().map(|v| v.semver.clone())
    }

    pub fn asset_name(&self, id: Uuid) -> Option<String> {
        self.state.assets.lock().unwrap().get(&id).map(|a| a.name.clone())
    }
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/v1/users/token", post(token))
        .route("/api/v1/users/me", get(me))
        .route("/api/v1/assets/", get(list_assets).post(create_asset))
        .route("/api/v1/assets/:uuid", get(asset_info).put(update_asset))
        .route(
            "/api/v1/assets/:uuid/versions",
            get(list_versions).post(upload_version),
        )
        .route("/api/v1/assets/:uuid/versions/:semver/file", get(download_file))
        .with_state(state)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn asset_json(id: Uuid, asset: &StoredAsset) -> Value {
    json!({
        "id": id,
        "asset_name": asset.name,
        "author_pennkey": USERNAME,
        "keywords": asset.keywords,
        "image_uri": null
    })
}

fn version_json(id: Uuid, version: &StoredVersion) -> Value {
    json!({
        "asset_id": id,
        "semver": version.semver,
        "message": version.message,
        "author_pennkey": USERNAME,
        "date": "2024-04-22T15:04:05.123456"
    })
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD)
    {
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    Json(json!({
        "pennkey": USERNAME,
        "first_name": "Jane",
        "last_name": "Doe",
        "school": "seas"
    }))
    .into_response()
}

async fn create_asset(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let id = Uuid::new_v4();
    let asset = StoredAsset {
        name: body["asset_name"].as_str().unwrap_or_default().to_string(),
        keywords: body["keywords"].as_str().unwrap_or_default().to_string(),
        versions: Vec::new(),
    };
    let response = asset_json(id, &asset);
    state.assets.lock().unwrap().insert(id, asset);
    Json(response).into_response()
}

async fn update_asset(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let mut assets = state.assets.lock().unwrap();
    let Some(asset) = assets.get_mut(&id) else {
        return detail(StatusCode::NOT_FOUND, "Asset not found");
    };
    asset.name = body["asset_name"].as_str().unwrap_or_default().to_string();
    asset.keywords = body["keywords"].as_str().unwrap_or_default().to_string();
    Json(asset_json(id, asset)).into_response()
}

async fn asset_info(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Response {
    let assets = state.assets.lock().unwrap();
    let Some(asset) = assets.get(&id) else {
        return detail(StatusCode::NOT_FOUND, "Asset not found");
    };
    let versions: Vec<Value> = asset.versions.iter().take(3).map(|v| version_json(id, v)).collect();
    Json(json!({ "asset": asset_json(id, asset), "versions": versions })).into_response()
}

fn offset(query: &HashMap<String, String>) -> usize {
    query.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0)
}

async fn list_assets(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let search = query.get("search").map(|s| s.to_lowercase());
    let assets = state.assets.lock().unwrap();

    let mut matching: Vec<(&Uuid, &StoredAsset)> = assets
        .iter()
        .filter(|(_, asset)| match &search {
            Some(search) => asset.name.to_lowercase().contains(search.as_str()),
            None => true,
        })
        .collect();
    matching.sort_by(|a, b| a.1.name.cmp(&b.1.name));

    let page: Vec<Value> = matching
        .into_iter()
        .skip(offset(&query))
        .take(LISTING_PAGE_SIZE)
        .map(|(id, asset)| asset_json(*id, asset))
        .collect();
    Json(page).into_response()
}

async fn list_versions(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let assets = state.assets.lock().unwrap();
    let Some(asset) = assets.get(&id) else {
        return detail(StatusCode::NOT_FOUND, "Asset not found");
    };
    let versions: Vec<Value> = asset
        .versions
        .iter()
        .skip(offset(&query))
        .take(LISTING_PAGE_SIZE)
        .map(|v| version_json(id, v))
        .collect();
    Json(versions).into_response()
}

async fn download_file(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path((id, semver)): Path<(Uuid, String)>,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let assets = state.assets.lock().unwrap();
    match assets
        .get(&id)
        .and_then(|a| a.versions.iter().find(|v| v.semver == semver))
    {
        Some(version) => (StatusCode::OK, version.archive.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "File not found"),
    }
}

async fn upload_version(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }

    let mut message = String::new();
    let mut is_major = false;
    let mut archive = Bytes::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap_or_default();
        match name.as_str() {
            "message" => message = String::from_utf8_lossy(&data).into_owned(),
            "is_major" => is_major = &data[..] == b"true",
            "file" => archive = data,
            _ => {}
        }
    }

    let mut assets = state.assets.lock().unwrap();
    let Some(asset) = assets.get_mut(&id) else {
        return detail(StatusCode::NOT_FOUND, "Asset not found");
    };
    let semver = next_semver(asset.versions.iter().map(|v| v.semver.as_str()), is_major);
    let version = StoredVersion {
        semver,
        message,
        archive,
    };
    let response = version_json(id, &version);
    asset.versions.insert(0, version);
    state.uploads.fetch_add(1, Ordering::SeqCst);
    Json(response).into_response()
}
