// In-process mock of the document-management backend.
// - strict client timeouts and no_proxy so localhost is never hijacked
// - graceful shutdown so servers don't linger between tests
// - token rotation and failure switches are plain fields on MockState
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::redirect::Policy;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use vellum_client::ApiClient;
use vellum_rbac::MemoryCredentialStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "secret";

/// Mutable backend state shared with the handlers.
#[derive(Debug)]
pub struct MockState {
    /// Access token the backend currently accepts.
    pub access_token: String,
    /// Refresh token the backend currently accepts; `None` rejects every refresh.
    pub refresh_token: Option<String>,
    pub issued: u32,
    pub refresh_calls: u32,
    pub logout_calls: u32,
    pub fail_logout: bool,
    pub fail_permissions: bool,
    /// Rejects every bearer token, including freshly refreshed ones.
    pub reject_all_bearer: bool,
    pub role_list_calls: u32,
    pub role_name: String,
    pub my_permissions: Vec<&'static str>,
    pub deleted_roles: Vec<String>,
    pub role_permission_updates: Vec<(String, Vec<String>)>,
    pub last_user_query: Option<HashMap<String, String>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            access_token: "access-0".to_string(),
            refresh_token: Some("refresh-0".to_string()),
            issued: 0,
            refresh_calls: 0,
            logout_calls: 0,
            fail_logout: false,
            fail_permissions: false,
            reject_all_bearer: false,
            role_list_calls: 0,
            role_name: "ADMIN".to_string(),
            my_permissions: vec!["users:read", "users:update"],
            deleted_roles: Vec::new(),
            role_permission_updates: Vec::new(),
            last_user_query: None,
        }
    }
}

impl MockState {
    /// Issues a fresh pair and makes it the only accepted one.
    fn rotate(&mut self) -> (String, String) {
        self.issued += 1;
        self.access_token = format!("access-{}", self.issued);
        let refresh = format!("refresh-{}", self.issued);
        self.refresh_token = Some(refresh.clone());
        (self.access_token.clone(), refresh)
    }

    /// Invalidates the current access token without touching the refresh token.
    pub fn expire_access_token(&mut self) {
        self.access_token = "access-expired-on-server".to_string();
    }

    fn identity(&self) -> Value {
        json!({
            "id": "u-1",
            "name": "Demo Admin",
            "email": ADMIN_EMAIL,
            "role": { "name": self.role_name, "description": "Administrator" }
        })
    }
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub base_url: String,
    state: Shared,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self::start_with(MockState::default()).await
    }

    pub async fn start_with(state: MockState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr: SocketAddr = listener.local_addr().expect("mock backend addr");
        let state = Arc::new(Mutex::new(state));
        let (shutdown, handle) = spawn_axum_with_shutdown(listener, router(state.clone()));

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            shutdown: Some(shutdown),
            handle,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// A client pointed at this backend with an empty in-memory store.
    pub fn client(&self) -> ApiClient<MemoryCredentialStore> {
        ApiClient::with_http(build_test_client(), &self.base_url, MemoryCredentialStore::new())
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}

pub fn build_test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .no_proxy()
        .redirect(Policy::none())
        .build()
        .expect("build test http client")
}

pub fn spawn_axum_with_shutdown(
    listener: TcpListener,
    router: Router,
) -> (oneshot::Sender<()>, JoinHandle<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let serve = axum::serve(listener, router.into_make_service());
        let _ = serve
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });
    (shutdown_tx, handle)
}

// ============================================================================
// Routes
// ============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh-token", post(refresh_token))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/profile", get(profile))
        .route("/api/permissions", get(all_permissions))
        .route("/api/permissions/my-permissions", get(my_permissions))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/search", get(search_users))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/roles", get(list_roles).post(create_role))
        .route("/api/roles/search", get(search_roles))
        .route(
            "/api/roles/{id}",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/api/roles/{id}/permissions", post(set_role_permissions))
        .with_state(state)
}

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    if state.reject_all_bearer {
        return false;
    }
    let expected = format!("Bearer {}", state.access_token);
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

macro_rules! require_auth {
    ($state:expr, $headers:expr) => {
        if !authorized(&$state, &$headers) {
            return error(StatusCode::UNAUTHORIZED, "Invalid or expired token");
        }
    };
}

fn permission(id: &str, name: &str) -> Value {
    let (resource, action) = name.split_once(':').unwrap_or((name, ""));
    json!({
        "id": id,
        "name": name,
        "description": format!("Can {action} {resource}"),
        "resource": resource,
        "action": action,
    })
}

fn catalog() -> Vec<Value> {
    [
        "documents:read",
        "users:read",
        "users:create",
        "users:update",
        "users:delete",
        "roles:read",
        "roles:update",
        "roles:delete",
        "permissions:read",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| permission(&format!("p-{i}"), name))
    .collect()
}

fn user(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "isActive": true,
        "emailVerified": false,
        "role": { "name": "EDITOR", "description": "" }
    })
}

fn role(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "description": format!("{name} role"), "permissions": [] })
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("mock state poisoned");
    if body["email"] != ADMIN_EMAIL || body["password"] != ADMIN_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let (access, refresh) = state.rotate();
    data(json!({
        "user": state.identity(),
        "accessToken": access,
        "refreshToken": refresh,
    }))
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == ADMIN_EMAIL {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    data(json!({
        "id": "u-new",
        "name": body["name"],
        "email": body["email"],
    }))
}

async fn refresh_token(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("mock state poisoned");
    state.refresh_calls += 1;

    let presented = body["refreshToken"].as_str();
    if presented.is_none() || presented != state.refresh_token.as_deref() {
        return error(StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }

    let (access, refresh) = state.rotate();
    data(json!({ "accessToken": access, "refreshToken": refresh }))
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("mock state poisoned");
    state.logout_calls += 1;
    if state.fail_logout {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Logout exploded");
    }
    require_auth!(state, headers);

    state.refresh_token = None;
    Json(json!({ "message": "Logged out" })).into_response()
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    data(state.identity())
}

async fn all_permissions(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    data(Value::Array(catalog()))
}

async fn my_permissions(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    if state.fail_permissions {
        return error(StatusCode::SERVICE_UNAVAILABLE, "Permission service down");
    }

    let permissions: Vec<Value> = state
        .my_permissions
        .iter()
        .enumerate()
        .map(|(i, name)| permission(&format!("m-{i}"), name))
        .collect();
    data(json!({ "permissions": permissions }))
}

async fn list_users(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    state.last_user_query = Some(query.clone());

    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    data(json!({
        "users": [user("u-2", "Grace"), user("u-3", "Linus")],
        "pagination": {
            "currentPage": page,
            "totalPages": 3,
            "totalUsers": 25,
            "hasNext": page < 3,
            "hasPrev": page > 1,
        }
    }))
}

async fn search_users(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    state.last_user_query = Some(query.clone());

    let term = query.get("q").map(|q| q.to_lowercase()).unwrap_or_default();
    let users: Vec<Value> = [user("u-2", "Grace"), user("u-3", "Linus")]
        .into_iter()
        .filter(|u| {
            u["name"]
                .as_str()
                .is_some_and(|n| n.to_lowercase().contains(&term))
        })
        .collect();
    let total = users.len();
    data(json!({
        "users": users,
        "pagination": { "currentPage": 1, "totalPages": 1, "totalUsers": total }
    }))
}

async fn get_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    if id == "missing" {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    data(user(&id, "Grace"))
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    if body["email"] == ADMIN_EMAIL {
        return error(StatusCode::CONFLICT, "Email already in use");
    }

    let mut created = user("u-9", body["name"].as_str().unwrap_or("New"));
    created["email"] = body["email"].clone();
    (StatusCode::CREATED, Json(json!({ "data": created }))).into_response()
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);

    let mut updated = user(&id, "Grace");
    if let Some(name) = body.get("name") {
        updated["name"] = name.clone();
    }
    data(updated)
}

async fn delete_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    Json(json!({ "message": "User deleted" })).into_response()
}

async fn list_roles(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("mock state poisoned");
    state.role_list_calls += 1;
    require_auth!(state, headers);
    data(json!([
        role("r-0", "SUPER_ADMIN"),
        role("r-1", "ADMIN"),
        role("r-2", "EDITOR")
    ]))
}

async fn search_roles(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    let term = query.get("q").map(|q| q.to_uppercase()).unwrap_or_default();
    let roles: Vec<Value> = [role("r-1", "ADMIN"), role("r-2", "EDITOR")]
        .into_iter()
        .filter(|r| r["name"].as_str().is_some_and(|n| n.contains(&term)))
        .collect();
    data(Value::Array(roles))
}

async fn get_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    let name = match id.as_str() {
        "r-0" => "SUPER_ADMIN",
        "r-1" => "ADMIN",
        _ => "EDITOR",
    };
    data(role(&id, name))
}

async fn create_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    let mut created = role("r-9", body["name"].as_str().unwrap_or("NEW"));
    created["description"] = body["description"].clone();
    (StatusCode::CREATED, Json(json!({ "data": created }))).into_response()
}

async fn update_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    let mut updated = role(&id, body["name"].as_str().unwrap_or("EDITOR"));
    updated["description"] = body["description"].clone();
    data(updated)
}

async fn delete_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    state.deleted_roles.push(id);
    Json(json!({ "message": "Role deleted" })).into_response()
}

async fn set_role_permissions(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state poisoned");
    require_auth!(state, headers);
    let ids = body["permissionIds"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    state.role_permission_updates.push((id, ids));
    Json(json!({ "message": "Permissions updated" })).into_response()
}
