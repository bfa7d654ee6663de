//! # vellum-client: Backend client for the Vellum admin console
//!
//! - **Transport** ([`ApiClient`]): JSON over HTTP with bearer-token
//!   injection and a single refresh-and-retry on `401`
//! - **Services**: [`AuthApi`], [`UsersApi`], [`RolesApi`], [`PermissionsApi`]
//! - **Console** ([`Console`]): login, logout, restore and permission refresh
//!   flows that populate a [`vellum_rbac::Session`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  Console                     │──► Session (vellum-rbac)
//! └──────────────┬───────────────┘
//!                │ &mut
//!                ▼
//! ┌──────────────────────────────┐     ┌──────────────────┐
//! │  ApiClient<S>                │────►│  CredentialStore │
//! │  ├─ AuthApi                  │     │  token           │
//! │  ├─ UsersApi                 │     │  refreshToken    │
//! │  ├─ RolesApi                 │     │  identity        │
//! │  └─ PermissionsApi           │     └──────────────────┘
//! └──────────────┬───────────────┘
//!                │ reqwest
//!                ▼
//!        REST backend (/api)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vellum_client::{ApiClient, Console};
//! use vellum_rbac::MemoryCredentialStore;
//! use vellum_types::Credentials;
//!
//! # async fn run() -> vellum_client::Result<()> {
//! let client = ApiClient::new(
//!     "http://localhost:5001/api",
//!     Duration::from_secs(10),
//!     MemoryCredentialStore::new(),
//! )?;
//! let mut console = Console::new(client);
//!
//! console
//!     .login(&Credentials::new("admin@example.com", "secret"))
//!     .await?;
//! if console.authorizer().has_permission("users:read") {
//!     let page = console.client().users().list(&Default::default()).await;
//!     let page = console.settle(page)?;
//!     println!("{} users", page.pagination.total_users);
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod console;
mod error;
mod permissions;
mod roles;
mod users;

pub use auth::AuthApi;
pub use client::ApiClient;
pub use console::Console;
pub use error::{ClientError, Result};
pub use permissions::PermissionsApi;
pub use roles::RolesApi;
pub use users::UsersApi;
