//! `/users` endpoints.

use vellum_rbac::CredentialStore;
use vellum_types::{NewUser, UserId, UserPage, UserQuery, UserRecord, UserUpdate};

use crate::client::{ApiClient, Request};
use crate::error::Result;

/// User account endpoints.
pub struct UsersApi<'c, S> {
    client: &'c mut ApiClient<S>,
}

impl<'c, S: CredentialStore> UsersApi<'c, S> {
    pub(crate) fn new(client: &'c mut ApiClient<S>) -> Self {
        Self { client }
    }

    /// `GET /users?page&limit[&search]`
    pub async fn list(self, query: &UserQuery) -> Result<UserPage> {
        let mut request = Request::get("/users")
            .query("page", query.page)
            .query("limit", query.limit);
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            request = request.query("search", search);
        }
        self.client.fetch(request).await
    }

    /// `GET /users/search?q&page&limit`
    pub async fn search(self, term: &str, query: &UserQuery) -> Result<UserPage> {
        let request = Request::get("/users/search")
            .query("q", term)
            .query("page", query.page)
            .query("limit", query.limit);
        self.client.fetch(request).await
    }

    pub async fn get(self, id: &UserId) -> Result<UserRecord> {
        self.client.fetch(Request::get(format!("/users/{id}"))).await
    }

    pub async fn create(self, draft: &NewUser) -> Result<UserRecord> {
        let request = Request::post("/users").json(draft)?;
        self.client.fetch(request).await
    }

    pub async fn update(self, id: &UserId, update: &UserUpdate) -> Result<UserRecord> {
        let request = Request::put(format!("/users/{id}")).json(update)?;
        self.client.fetch(request).await
    }

    pub async fn delete(self, id: &UserId) -> Result<()> {
        self.client
            .fetch_ack(Request::delete(format!("/users/{id}")))
            .await
    }
}
