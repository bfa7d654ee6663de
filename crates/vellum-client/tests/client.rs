//! Transport and service tests against the in-process mock backend.

mod support;

use support::{ADMIN_EMAIL, ADMIN_PASSWORD, MockBackend};
use vellum_client::ClientError;
use vellum_rbac::{CredentialKey, CredentialStore};
use vellum_types::{
    Credentials, NewUser, PermissionId, RoleDraft, RoleId, UserId, UserQuery, UserUpdate,
};

fn stored(store: &impl CredentialStore, key: CredentialKey) -> Option<String> {
    store.get(key).expect("memory store never fails")
}

#[tokio::test]
async fn login_returns_grant_and_rejects_bad_credentials() {
    let backend = MockBackend::start().await;
    let mut client = backend.client();

    let grant = client
        .auth()
        .login(&Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD))
        .await
        .expect("login");
    assert_eq!(grant.user.role_name(), Some("ADMIN"));
    assert_eq!(grant.tokens.access_token, "access-1");

    let err = client
        .auth()
        .login(&Credentials::new(ADMIN_EMAIL, "wrong"))
        .await
        .expect_err("bad password");
    assert!(matches!(
        &err,
        ClientError::Api { status: 401, message } if message == "Invalid credentials"
    ));
    // A rejected login is not a session expiry: no refresh was attempted.
    assert_eq!(backend.state().refresh_calls, 0);

    backend.shutdown().await;
}

#[tokio::test]
async fn register_and_explicit_refresh() {
    let backend = MockBackend::start().await;
    let mut client = backend.client();

    let draft = NewUser {
        name: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        phone: None,
        password: "hunter2".to_string(),
        role_id: None,
        image: None,
    };
    let created = client.auth().register(&draft).await.expect("register");
    assert_eq!(created.email, "grace@example.com");
    assert!(created.role.is_none());

    let taken = NewUser {
        email: ADMIN_EMAIL.to_string(),
        ..draft
    };
    let err = client.auth().register(&taken).await.expect_err("duplicate email");
    assert_eq!(err.status(), Some(409));

    let pair = client.auth().refresh("refresh-0").await.expect("refresh");
    assert_eq!(pair.access_token, "access-1");
    assert_eq!(pair.refresh_token, "refresh-1");
    // The explicit call returns the pair without persisting it.
    assert_eq!(stored(client.store(), CredentialKey::Token), None);

    let err = client.auth().refresh("refresh-0").await.expect_err("rotated away");
    assert_eq!(err.status(), Some(401));

    backend.shutdown().await;
}

#[tokio::test]
async fn bearer_token_is_attached_from_store() {
    let backend = MockBackend::start().await;
    let mut client = backend.client();

    let grant = client
        .auth()
        .login(&Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD))
        .await
        .expect("login");
    client.store_tokens(&grant.tokens).expect("store tokens");

    let profile = client.auth().profile().await.expect("profile");
    assert_eq!(profile.email, ADMIN_EMAIL);
    assert_eq!(backend.state().refresh_calls, 0);

    backend.shutdown().await;
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_retried_once() {
    let backend = MockBackend::start().await;
    let mut client = backend.client();
    client
        .store_mut()
        .set(CredentialKey::Token, "stale")
        .expect("set token");
    client
        .store_mut()
        .set(CredentialKey::RefreshToken, "refresh-0")
        .expect("set refresh token");

    let permissions = client.permissions().mine().await.expect("retried request");
    let names: Vec<&str> = permissions.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["users:read", "users:update"]);

    assert_eq!(backend.state().refresh_calls, 1);
    assert_eq!(
        stored(client.store(), CredentialKey::Token).as_deref(),
        Some("access-1")
    );
    assert_eq!(
        stored(client.store(), CredentialKey::RefreshToken).as_deref(),
        Some("refresh-1")
    );

    backend.shutdown().await;
}

#[tokio::test]
async fn failed_refresh_clears_tokens_and_reports_expiry() {
    let backend = MockBackend::start().await;
    backend.state().refresh_token = None;

    let mut client = backend.client();
    client
        .store_mut()
        .set(CredentialKey::Token, "stale")
        .expect("set token");
    client
        .store_mut()
        .set(CredentialKey::RefreshToken, "refresh-revoked")
        .expect("set refresh token");
    client
        .store_mut()
        .set(CredentialKey::Identity, "{}")
        .expect("set identity");

    let err = client.users().list(&UserQuery::default()).await.expect_err("expired");
    assert!(err.is_session_expired());
    assert_eq!(backend.state().refresh_calls, 1);
    assert_eq!(stored(client.store(), CredentialKey::Token), None);
    assert_eq!(stored(client.store(), CredentialKey::RefreshToken), None);
    // Identity is the console's to clear.
    assert!(stored(client.store(), CredentialKey::Identity).is_some());

    backend.shutdown().await;
}

#[tokio::test]
async fn retried_401_expires_without_looping() {
    let backend = MockBackend::start().await;
    backend.state().reject_all_bearer = true;

    let mut client = backend.client();
    client
        .store_mut()
        .set(CredentialKey::Token, "stale")
        .expect("set token");
    client
        .store_mut()
        .set(CredentialKey::RefreshToken, "refresh-0")
        .expect("set refresh token");

    let err = client.roles().list().await.expect_err("expired");
    assert!(matches!(err, ClientError::SessionExpired));
    {
        let state = backend.state();
        assert_eq!(state.role_list_calls, 2);
        assert_eq!(state.refresh_calls, 1);
    }
    assert_eq!(stored(client.store(), CredentialKey::Token), None);
    assert_eq!(stored(client.store(), CredentialKey::RefreshToken), None);

    backend.shutdown().await;
}

#[tokio::test]
async fn missing_refresh_token_expires_without_calling_backend() {
    let backend = MockBackend::start().await;
    let mut client = backend.client();
    client
        .store_mut()
        .set(CredentialKey::Token, "stale")
        .expect("set token");

    let err = client.roles().list().await.expect_err("expired");
    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(backend.state().refresh_calls, 0);
    assert_eq!(stored(client.store(), CredentialKey::Token), None);

    backend.shutdown().await;
}

#[tokio::test]
async fn non_auth_errors_map_to_api_error() {
    let backend = MockBackend::start().await;
    let mut client = backend.client();
    let grant = client
        .auth()
        .login(&Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD))
        .await
        .expect("login");
    client.store_tokens(&grant.tokens).expect("store tokens");

    let err = client
        .users()
        .get(&UserId::new("missing"))
        .await
        .expect_err("not found");
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_session_expired());

    let err = client
        .users()
        .create(&NewUser {
            name: "Dup".to_string(),
            email: ADMIN_EMAIL.to_string(),
            phone: None,
            password: "pw".to_string(),
            role_id: None,
            image: None,
        })
        .await
        .expect_err("conflict");
    assert!(err.to_string().contains("Email already in use"));

    backend.shutdown().await;
}

#[tokio::test]
async fn user_service_round_trip() {
    let backend = MockBackend::start().await;
    let mut client = backend.client();
    let grant = client
        .auth()
        .login(&Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD))
        .await
        .expect("login");
    client.store_tokens(&grant.tokens).expect("store tokens");

    let query = UserQuery {
        page: 2,
        search: Some("gr".to_string()),
        ..UserQuery::default()
    };
    let page = client.users().list(&query).await.expect("list users");
    assert_eq!(page.users.len(), 2);
    assert_eq!(page.pagination.current_page, 2);
    assert!(page.pagination.has_prev);
    let sent = backend.state().last_user_query.clone().expect("query recorded");
    assert_eq!(sent.get("limit").map(String::as_str), Some("10"));
    assert_eq!(sent.get("search").map(String::as_str), Some("gr"));

    let found = client
        .users()
        .search("lin", &UserQuery::default())
        .await
        .expect("search users");
    assert_eq!(found.users.len(), 1);
    assert_eq!(found.users[0].name, "Linus");

    let updated = client
        .users()
        .update(
            &UserId::new("u-2"),
            &UserUpdate {
                name: Some("Grace H.".to_string()),
                ..UserUpdate::default()
            },
        )
        .await
        .expect("update user");
    assert_eq!(updated.name, "Grace H.");

    client
        .users()
        .delete(&UserId::new("u-2"))
        .await
        .expect("delete user");

    backend.shutdown().await;
}

#[tokio::test]
async fn role_and_permission_services() {
    let backend = MockBackend::start().await;
    let mut client = backend.client();
    let grant = client
        .auth()
        .login(&Credentials::new(ADMIN_EMAIL, ADMIN_PASSWORD))
        .await
        .expect("login");
    client.store_tokens(&grant.tokens).expect("store tokens");

    let roles = client.roles().list().await.expect("list roles");
    assert_eq!(roles.len(), 3);
    assert!(roles[0].is_protected());

    let hits = client.roles().search("edit").await.expect("search roles");
    assert_eq!(hits.len(), 1);

    let created = client
        .roles()
        .create(&RoleDraft {
            name: "REVIEWER".to_string(),
            description: "Reviews documents".to_string(),
        })
        .await
        .expect("create role");
    assert_eq!(created.name, "REVIEWER");
    assert_eq!(created.description, "Reviews documents");

    let ids = [PermissionId::new("p-0"), PermissionId::new("p-1")];
    client
        .roles()
        .set_permissions(&RoleId::new("r-2"), &ids)
        .await
        .expect("set permissions");
    client
        .roles()
        .delete(&RoleId::new("r-2"))
        .await
        .expect("delete role");

    {
        let state = backend.state();
        assert_eq!(
            state.role_permission_updates,
            vec![("r-2".to_string(), vec!["p-0".to_string(), "p-1".to_string()])]
        );
        assert_eq!(state.deleted_roles, vec!["r-2".to_string()]);
    }

    let catalog = client.permissions().list().await.expect("catalog");
    assert!(catalog.iter().any(|p| p.name == "permissions:read"));

    backend.shutdown().await;
}
