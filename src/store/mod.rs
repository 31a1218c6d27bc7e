//! Persistence layer for the mentorship platform.
//!
//! The rest of the server only sees the `CredentialStore` and
//! `ResourceStore` traits; Postgres backs them in production and an
//! in-memory implementation backs tests and local development.

pub mod memory;
pub mod models;
pub mod postgres;

use crate::error::StoreError;
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use models::{NewResource, NewUser, Resource, ResourceFilter, UserProfile};
pub use postgres::PgStore;

/// Lookup and creation of user identities. The auth subsystem reads on
/// login/verify and inserts on signup; it never mutates existing rows.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn find_by_uid(&self, uid: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Persists a new user and assigns the surrogate id.
    async fn insert_user(&self, user: NewUser) -> Result<UserProfile, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;
}

/// Directory resources: filtered listing, search, and the recommendation
/// query.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn insert_resource(&self, resource: NewResource) -> Result<Resource, StoreError>;

    async fn list_resources(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, StoreError>;

    /// Case-insensitive substring match over title and description.
    async fn search_resources(&self, query: &str) -> Result<Vec<Resource>, StoreError>;

    /// Resources whose category is among `interests`; when
    /// `include_women_focused` is set, resources whose title mentions
    /// "women" match as well.
    async fn recommend_resources(
        &self,
        interests: &[String],
        include_women_focused: bool,
    ) -> Result<Vec<Resource>, StoreError>;

    async fn count_resources(&self) -> Result<i64, StoreError>;

    /// Resources whose deadline lies in the future.
    async fn count_open_opportunities(&self) -> Result<i64, StoreError>;
}
