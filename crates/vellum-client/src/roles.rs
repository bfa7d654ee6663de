//! `/roles` endpoints.
//!
//! These calls do not apply the built-in role rules; callers check
//! [`vellum_rbac::roles`] before deleting or re-permissioning a role.

use serde::Serialize;
use vellum_rbac::CredentialStore;
use vellum_types::{PermissionId, RoleDraft, RoleId, RoleRecord};

use crate::client::{ApiClient, Request};
use crate::error::Result;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionIds<'a> {
    permission_ids: &'a [PermissionId],
}

/// Role catalog endpoints.
pub struct RolesApi<'c, S> {
    client: &'c mut ApiClient<S>,
}

impl<'c, S: CredentialStore> RolesApi<'c, S> {
    pub(crate) fn new(client: &'c mut ApiClient<S>) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<Vec<RoleRecord>> {
        self.client.fetch(Request::get("/roles")).await
    }

    pub async fn search(self, term: &str) -> Result<Vec<RoleRecord>> {
        self.client
            .fetch(Request::get("/roles/search").query("q", term))
            .await
    }

    pub async fn get(self, id: &RoleId) -> Result<RoleRecord> {
        self.client.fetch(Request::get(format!("/roles/{id}"))).await
    }

    pub async fn create(self, draft: &RoleDraft) -> Result<RoleRecord> {
        let request = Request::post("/roles").json(draft)?;
        self.client.fetch(request).await
    }

    pub async fn update(self, id: &RoleId, draft: &RoleDraft) -> Result<RoleRecord> {
        let request = Request::put(format!("/roles/{id}")).json(draft)?;
        self.client.fetch(request).await
    }

    pub async fn delete(self, id: &RoleId) -> Result<()> {
        self.client
            .fetch_ack(Request::delete(format!("/roles/{id}")))
            .await
    }

    /// Replaces the role's permission set with exactly `permission_ids`.
    pub async fn set_permissions(self, id: &RoleId, permission_ids: &[PermissionId]) -> Result<()> {
        let request = Request::post(format!("/roles/{id}/permissions"))
            .json(&PermissionIds { permission_ids })?;
        self.client.fetch_ack(request).await
    }
}
