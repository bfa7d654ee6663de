//! `/permissions` endpoints.

use serde::Deserialize;
use vellum_rbac::CredentialStore;
use vellum_types::PermissionRecord;

use crate::client::{ApiClient, Request};
use crate::error::Result;

#[derive(Deserialize)]
struct MyPermissions {
    #[serde(default)]
    permissions: Vec<PermissionRecord>,
}

/// Permission catalog endpoints.
pub struct PermissionsApi<'c, S> {
    client: &'c mut ApiClient<S>,
}

impl<'c, S: CredentialStore> PermissionsApi<'c, S> {
    pub(crate) fn new(client: &'c mut ApiClient<S>) -> Self {
        Self { client }
    }

    /// `GET /permissions`: the full catalog.
    pub async fn list(self) -> Result<Vec<PermissionRecord>> {
        self.client.fetch(Request::get("/permissions")).await
    }

    /// `GET /permissions/my-permissions`: grants of the signed-in user.
    ///
    /// A response without a `permissions` list is an empty list.
    pub async fn mine(self) -> Result<Vec<PermissionRecord>> {
        let mine: MyPermissions = self
            .client
            .fetch(Request::get("/permissions/my-permissions"))
            .await?;
        Ok(mine.permissions)
    }
}
